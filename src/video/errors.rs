use super::shader::{ProgramState, StageKind};

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Failed to compile {} shader, errors: \n{}", stage, log)]
    Compile { stage: StageKind, log: String },
    #[fail(display = "Failed to link program, errors: \n{}", log)]
    Link { log: String },
    #[fail(display = "Failed to create {}.", _0)]
    ResourceCreation(String),
    #[fail(display = "Invalid vertex layout: {}.", _0)]
    LayoutViolation(String),
    #[fail(display = "The source of {} shader is empty.", _0)]
    EmptySource(StageKind),
    #[fail(display = "A {} stage has already been attached.", _0)]
    DuplicateStage(StageKind),
    #[fail(display = "Vertex shader is required to describe a proper render pipeline.")]
    MissingVertexStage,
    #[fail(display = "Program is not linked ({:?}).", _0)]
    ProgramNotLinked(ProgramState),
    #[fail(display = "Program has already been linked.")]
    AlreadyLinked,
    #[fail(display = "Program has been released.")]
    ProgramReleased,
    #[fail(display = "Geometry has been released.")]
    GeometryReleased,
    #[fail(display = "Texture has been released.")]
    TextureReleased,
    #[fail(display = "Indexed drawing requires an index buffer.")]
    MissingIndexBuffer,
    #[fail(display = "Index {} is out of bounds [0, {}).", index, len)]
    IndexOutOfBounds { index: u32, len: u32 },
    #[fail(display = "Images with {} channels are not supported.", _0)]
    UnsupportedChannels(u8),
    #[fail(display = "Image data has {} bytes instead of {}.", _0, _1)]
    ImageSizeMismatch(usize, usize),
    #[fail(display = "Failed to decode image: {}", _0)]
    Decode(String),
    #[fail(display = "Texture unit {} exceeds the limit of {} units.", _0, _1)]
    TooManyTextureUnits(usize, usize),
    #[fail(display = "Trying to update immutable buffer.")]
    UpdateImmutableBuffer,
    #[fail(display = "Out of bounds.")]
    OutOfBounds,
    #[fail(display = "OpenGL implementation doesn\'t support {}.", _0)]
    Requirement(String),
    #[fail(display = "Backend: {}", _0)]
    Backend(String),
}

pub type Result<T> = ::std::result::Result<T, Error>;

impl From<::image::ImageError> for Error {
    fn from(err: ::image::ImageError) -> Error {
        Error::Decode(format!("{}", err))
    }
}
