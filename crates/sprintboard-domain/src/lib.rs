pub mod field_update;
pub mod filter;
pub mod query;
pub mod search;
pub mod sort;
pub mod sprint;
pub mod task;
pub mod user;
pub mod validation;

pub use field_update::FieldUpdate;
pub use query::{SprintQuery, TaskQuery, UserQuery};
pub use sort::{OrderingSpec, SortOrder};
pub use sprint::{Sprint, SprintDraft, SprintId, SprintUpdate};
pub use task::{ParseStatusError, Task, TaskDraft, TaskId, TaskStatus, TaskUpdate};
pub use user::{validate_username, CredentialError, NewUser, User, UserId};
pub use validation::{today, ValidationError};
