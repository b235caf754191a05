use crate::parser::ast::FunctionId;
use crate::runner::ds::env_record::EnvId;

/// One frame of the call stack.
///
/// The call-stack name and the environment record of a frame live in the
/// same entry, so the call stack and the environment stack always have the
/// same height.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionContext {
    pub name: String,
    pub function: Option<FunctionId>,
    pub lex_env: EnvId,
}

pub struct ExecutionContextStack {
    stack: Vec<ExecutionContext>,
}

impl ExecutionContextStack {
    pub fn new() -> Self {
        ExecutionContextStack { stack: Vec::new() }
    }

    pub fn get_running_execution_ctx(&self) -> Option<&ExecutionContext> {
        self.stack.last()
    }

    /// Pops the running context. The bottom (global) context is never popped.
    pub fn pop_running_execution_ctx(&mut self) -> Option<ExecutionContext> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    pub fn push_execution_ctx(&mut self, ctx: ExecutionContext) {
        self.stack.push(ctx)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Frame names, bottom first.
    pub fn call_stack(&self) -> Vec<String> {
        self.stack.iter().map(|c| c.name.clone()).collect()
    }

    /// Environment ids of all frames, bottom first.
    pub fn env_stack(&self) -> Vec<EnvId> {
        self.stack.iter().map(|c| c.lex_env).collect()
    }
}

impl Default for ExecutionContextStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(name: &str, env: EnvId) -> ExecutionContext {
        ExecutionContext {
            name: name.to_string(),
            function: None,
            lex_env: env,
        }
    }

    #[test]
    fn test_global_frame_is_never_popped() {
        let mut stack = ExecutionContextStack::new();
        stack.push_execution_ctx(frame("Global", 0));
        stack.push_execution_ctx(frame("f", 1));
        assert_eq!(stack.pop_running_execution_ctx().map(|c| c.name), Some("f".to_string()));
        assert!(stack.pop_running_execution_ctx().is_none());
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_call_and_env_stacks_stay_paired() {
        let mut stack = ExecutionContextStack::new();
        stack.push_execution_ctx(frame("Global", 0));
        stack.push_execution_ctx(frame("f", 3));
        assert_eq!(stack.call_stack(), vec!["Global", "f"]);
        assert_eq!(stack.env_stack(), vec![0, 3]);
        assert_eq!(stack.get_running_execution_ctx().map(|c| c.lex_env), Some(3));
    }
}
