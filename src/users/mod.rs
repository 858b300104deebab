/// User records and the store the authentication flows read them from.

mod postgres;
mod record;
mod store;

pub use postgres::PgUserStore;
pub use record::{NewUser, UserRecord};
pub use store::UserStore;
