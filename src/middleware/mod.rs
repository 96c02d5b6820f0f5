mod access_token;

pub use access_token::AccessTokenMiddleware;
