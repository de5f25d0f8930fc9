pub mod error;
pub mod value;

pub use error::{CoercionError, LookupError, ReadError, Result, SchemaError, StoreError};
pub use value::{ExtractError, FieldKind, FromValue, Value};
