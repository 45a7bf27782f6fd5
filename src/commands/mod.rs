pub mod check_evals;
pub mod logs;
pub mod model_mismatch;
pub mod print_evals;
pub mod schema;
