use std::{fs::File, io, path::Path};

use serde::Serialize;

/// What happened to one input file.
#[derive(Debug, Serialize)]
pub struct InputReport {
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoder: Option<String>,
    pub outputs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct ExtractionReport {
    pub inputs: Vec<InputReport>,
}

impl ExtractionReport {
    pub fn new() -> Self {
        ExtractionReport::default()
    }

    pub fn record_success(&mut self, input: &str, decoder: &str, outputs: Vec<String>) {
        self.inputs.push(InputReport {
            input: input.to_string(),
            decoder: Some(decoder.to_string()),
            outputs,
            error: None,
        });
    }

    pub fn record_failure(&mut self, input: &str, error: &dyn std::fmt::Display) {
        self.inputs.push(InputReport {
            input: input.to_string(),
            decoder: None,
            outputs: Vec::new(),
            error: Some(error.to_string()),
        });
    }

    pub fn failures(&self) -> usize {
        self.inputs.iter().filter(|input| input.error.is_some()).count()
    }

    pub fn write(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(())
    }
}
