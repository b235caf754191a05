pub mod env_record;
pub mod error;
pub mod execution_context;
pub mod heap;
pub mod step;
pub mod value;
