//! Timestamp and calendar-date codecs.

use bitbuf::{BitReader, BitWriter};
use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::error::{CodecError, CodecResult};
use crate::value::ValueCodec;

/// Day number of 1970-01-01 in chrono's days-from-CE scheme.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Codec for UTC timestamps: a signed 64-bit millisecond offset from the
/// Unix epoch, little-endian. Sub-millisecond precision is dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateTimeCodec;

impl ValueCodec<DateTime<Utc>> for DateTimeCodec {
    fn encode(&self, writer: &mut BitWriter, value: &DateTime<Utc>) -> CodecResult<()> {
        writer.write_bytes(&value.timestamp_millis().to_le_bytes())?;
        Ok(())
    }

    fn decode(&self, reader: &mut BitReader<'_>) -> CodecResult<DateTime<Utc>> {
        let millis = i64::from_le_bytes(reader.read_array()?);
        DateTime::from_timestamp_millis(millis).ok_or(CodecError::InvalidTimestamp { millis })
    }

    fn value_eq(&self, a: &DateTime<Utc>, b: &DateTime<Utc>) -> bool {
        // Compare at wire precision so sub-millisecond differences do not
        // force a resend.
        a.timestamp_millis() == b.timestamp_millis()
    }

    fn max_bits(&self) -> Option<usize> {
        Some(64)
    }
}

/// Codec for calendar dates: a signed 32-bit day offset from 1970-01-01,
/// little-endian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateCodec;

impl ValueCodec<NaiveDate> for DateCodec {
    fn encode(&self, writer: &mut BitWriter, value: &NaiveDate) -> CodecResult<()> {
        let days = value.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE;
        writer.write_bytes(&days.to_le_bytes())?;
        Ok(())
    }

    fn decode(&self, reader: &mut BitReader<'_>) -> CodecResult<NaiveDate> {
        let days = i32::from_le_bytes(reader.read_array()?);
        days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .ok_or(CodecError::InvalidDate { days })
    }

    fn value_eq(&self, a: &NaiveDate, b: &NaiveDate) -> bool {
        a == b
    }

    fn max_bits(&self) -> Option<usize> {
        Some(32)
    }
}
