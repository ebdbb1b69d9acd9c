use figcue_core::error::FigcueError;
use serde::Serialize;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), FigcueError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
