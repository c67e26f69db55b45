mod response;

pub mod error;
pub use error::{ApiError, ApiErrorKind, Detail};

pub mod validation;
pub use validation::ValidationErrors;

pub mod envelope;
pub use envelope::{Envelope, Header, Origin, Status};

pub mod groups;
