//! Deserialization that reports *where* in the JSON a field went wrong.
use serde::de::DeserializeOwned;

use crate::error::ArgvError;

fn located(path: String, inner: impl std::fmt::Display) -> ArgvError {
    ArgvError::invalid(format!("at JSON path {path} → {inner}"))
}

pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, ArgvError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de)
        .map_err(|err| located(err.path().to_string(), err.into_inner()))
}
