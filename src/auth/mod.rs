pub mod extract;
pub mod jwt;

pub use extract::{bearer_token, AuthUser, MaybeAuthUser};
pub use jwt::{Claims, JwtManager};
