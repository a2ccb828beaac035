mod token;
mod two_factor;
mod user;

pub use token::PostgresTokenRepository;
pub use two_factor::PostgresTwoFactorRepository;
pub use user::PostgresUserRepository;

use crate::account::errors::AccountError;

pub(crate) fn database_error(e: sqlx::Error) -> AccountError {
    AccountError::DatabaseError(e.to_string())
}
