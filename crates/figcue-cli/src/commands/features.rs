use figcue_core::error::FigcueError;
use std::path::PathBuf;

use crate::commands::EncodeRequest;

pub fn run(input_file: PathBuf, output_file: Option<PathBuf>) -> Result<(), FigcueError> {
    let request = EncodeRequest::load(&input_file)?;
    let body = figcue_core::encode_body(&request.document, &request.body)?;
    let text = body.feature_text();

    match output_file {
        Some(path) => {
            std::fs::write(&path, &text)?;
            eprintln!(
                "Encoded {} token(s), written to {}",
                body.len(),
                path.display()
            );
        }
        None => print!("{text}"),
    }

    Ok(())
}
