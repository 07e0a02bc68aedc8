use crate::domain::calculation::CalculationRecord;
use crate::error::Result;
use std::io::Write;

/// Writes calculation records as CSV.
///
/// The header matches the persisted field names:
/// `id,billAmount,tipPercent,tipAmount,totalAmount,timestamp`.
pub struct HistoryWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> HistoryWriter<W> {
    /// Creates a new `HistoryWriter` over any `Write` sink (e.g., Stdout, File).
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new().from_writer(sink);
        Self { writer }
    }

    /// Writes the records in the order given and flushes the sink.
    ///
    /// The header is written even when there are no records.
    pub fn write_records<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a CalculationRecord>,
    {
        self.writer.write_record([
            "id",
            "billAmount",
            "tipPercent",
            "tipAmount",
            "totalAmount",
            "timestamp",
        ])?;
        for record in records {
            self.writer.write_record([
                record.id.to_string(),
                record.bill_amount.normalize().to_string(),
                record.tip_percent.to_string(),
                record.tip_amount.normalize().to_string(),
                record.total_amount.normalize().to_string(),
                record.timestamp.to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
