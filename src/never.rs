/// Success type of the control and refresh loops: they only ever return with an error.
///
/// Rust's `!` is unstable as a type parameter, so this uninhabited enum stands in for it.
#[derive(Debug)]
pub enum Never {}
