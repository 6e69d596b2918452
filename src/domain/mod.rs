mod query;
mod record;

pub use query::Query;
pub use record::{Preview, Record};
