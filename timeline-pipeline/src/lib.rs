pub mod content;
pub mod executor;
pub mod post;
pub mod scheduler;
pub mod sweep;
pub mod thread;

pub use content::{normalize_newlines, split_into_chunks, truncate_to_limit};
pub use executor::{ActionExecutor, ExecutionReport};
pub use post::PostComposer;
pub use scheduler::{spawn_activity, ActivityCadence};
pub use sweep::{SweepOutcome, TimelineSweep};
pub use thread::ThreadReconstructor;
