use crate::domain::customer::CustomerSnapshot;
use crate::error::{CreditError, Result};
use std::io::Read;

/// Reads a customer directory from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over
/// `Result<CustomerSnapshot>`. Expected columns: `id`, `customerType`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct CustomerReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CustomerReader<R> {
    /// Creates a new `CustomerReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes customers.
    pub fn customers(self) -> impl Iterator<Item = Result<CustomerSnapshot>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(CreditError::from))
    }
}
