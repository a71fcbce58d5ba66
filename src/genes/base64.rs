use super::{Gene, GeneKind, StringGene};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Byte payload sent Base64-encoded; the wrapped string holds the raw data
#[derive(Debug, Clone)]
pub struct Base64Gene {
    data: Box<Gene>,
}

impl Base64Gene {
    pub const DATA_NAME: &'static str = "data";

    pub fn new(data: StringGene) -> Self {
        Self {
            data: Box::new(Gene::new(Self::DATA_NAME, GeneKind::String(data))),
        }
    }

    pub fn data(&self) -> &Gene {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Gene {
        &mut self.data
    }

    pub fn encoded(&self) -> String {
        STANDARD.encode(self.data.value_as_raw_string())
    }
}
