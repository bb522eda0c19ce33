use std::{
    fmt,
    fmt::{Debug, Display},
};

/// A wrapper around sensitive configuration values that masks the value in `Debug` and `Display`
/// output, so a Square access token, webhook signing secret or admin API key cannot leak into logs
/// by way of a formatted config struct. Call [`Secret::reveal`] to get at the inner value.
///
/// ```
/// use qm_common::Secret;
///
/// let token = Secret::new("EAAA-live-token".to_string());
/// assert_eq!(format!("{token:?}"), "****");
/// assert_eq!(token.reveal(), "EAAA-live-token");
/// ```
#[derive(Clone, Default)]
pub struct Secret<T>
where T: Clone + Default
{
    value: T,
}

impl<T: Clone + Default> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn reveal(&self) -> &T {
        &self.value
    }
}

impl<T: Clone + Default> Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T: Clone + Default> Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}
