#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Failed to create window: {}", _0)]
    Creation(String),
    #[fail(display = "OpenGL context failure: {}", _0)]
    Context(String),
}

pub type Result<T> = ::std::result::Result<T, Error>;

impl From<::glutin::CreationError> for Error {
    fn from(err: ::glutin::CreationError) -> Self {
        Error::Creation(format!("{}", err))
    }
}

impl From<::glutin::ContextError> for Error {
    fn from(err: ::glutin::ContextError) -> Self {
        Error::Context(format!("{}", err))
    }
}
