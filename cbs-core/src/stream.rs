//! AVB stream descriptors.
//!
//! A descriptor is given on the command line as comma-separated `key=value`
//! pairs, e.g. `class=a,transport=avtp-aaf,rate=8000,psize=32`. Parsing is
//! split in two stages: [`StreamDescriptor`] validates syntax and the closed
//! enum fields, [`StreamDescriptor::resolve`] coerces the numeric fields into
//! a [`StreamSpec`].

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::{CbsError, Result};

/// Maximum number of `key=value` pairs accepted in one descriptor.
pub const MAX_FIELDS: usize = 4;

const FIELD_SEPARATOR: char = ',';
const KEY_VALUE_SEPARATOR: char = '=';

/// IEEE 802.1Q Stream Reservation class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SrClass {
    /// Class A, the stricter latency class
    A,
    /// Class B
    B,
}

impl SrClass {
    /// Both SR classes in output order.
    pub const ALL: [SrClass; 2] = [SrClass::A, SrClass::B];
}

impl FromStr for SrClass {
    type Err = CbsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "a" => Ok(SrClass::A),
            "b" => Ok(SrClass::B),
            _ => Err(CbsError::InvalidValue {
                field: "class",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SrClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SrClass::A => write!(f, "A"),
            SrClass::B => write!(f, "B"),
        }
    }
}

/// AVTP stream format carried by the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Transport {
    /// AVTP Audio Format
    Aaf,
    /// AVTP Compressed Video Format, H.264 encapsulation
    CvfH264,
}

impl Transport {
    /// Name used in descriptors.
    pub fn as_str(self) -> &'static str {
        match self {
            Transport::Aaf => "avtp-aaf",
            Transport::CvfH264 => "avtp-cvf-h264",
        }
    }
}

impl FromStr for Transport {
    type Err = CbsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "avtp-aaf" => Ok(Transport::Aaf),
            "avtp-cvf-h264" => Ok(Transport::CvfH264),
            _ => Err(CbsError::InvalidValue {
                field: "transport",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Syntactically valid stream descriptor.
///
/// `class` and `transport` are already closed variants; `rate` and `psize`
/// are kept verbatim until [`resolve`](Self::resolve) coerces them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    pub class: SrClass,
    pub transport: Transport,
    pub rate: String,
    pub psize: String,
}

impl StreamDescriptor {
    /// Parses a `key=value[,key=value...]` descriptor string.
    ///
    /// Checks run in a fixed order so the first problem found is reported:
    /// pair syntax, pair count, then `class`, `transport`, `rate` and `psize`
    /// presence (and enum domain for the first two). A key given twice keeps
    /// its last value.
    ///
    /// # Errors
    /// - `CbsError::Format` - A pair without exactly one `=`
    /// - `CbsError::TooManyFields` - More than [`MAX_FIELDS`] pairs
    /// - `CbsError::MissingField` - A required key is absent
    /// - `CbsError::InvalidValue` - Unknown class or transport
    pub fn parse(descriptor: &str) -> Result<Self> {
        let mut fields: Vec<(&str, &str)> = Vec::new();
        let mut pair_count = 0;

        for token in descriptor.split(FIELD_SEPARATOR) {
            let mut parts = token.split(KEY_VALUE_SEPARATOR);
            let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(CbsError::Format {
                    token: token.to_string(),
                });
            };
            pair_count += 1;

            match fields.iter_mut().find(|(existing, _)| *existing == key) {
                Some(entry) => entry.1 = value,
                None => fields.push((key, value)),
            }
        }

        if pair_count > MAX_FIELDS {
            return Err(CbsError::TooManyFields {
                count: pair_count,
                max: MAX_FIELDS,
            });
        }

        let lookup = |field: &'static str| {
            fields
                .iter()
                .find(|(key, _)| *key == field)
                .map(|(_, value)| *value)
                .ok_or(CbsError::MissingField { field })
        };

        let class = lookup("class")?.parse()?;
        let transport = lookup("transport")?.parse()?;
        let rate = lookup("rate")?.to_string();
        let psize = lookup("psize")?.to_string();

        Ok(Self {
            class,
            transport,
            rate,
            psize,
        })
    }

    /// Coerces the numeric fields into a [`StreamSpec`].
    ///
    /// # Errors
    /// - `CbsError::InvalidValue` - `rate` is not a positive 32-bit integer
    ///   or `psize` is not a non-negative 32-bit integer
    pub fn resolve(&self) -> Result<StreamSpec> {
        let rate = parse_integer("rate", &self.rate)?;
        if rate == 0 {
            return Err(CbsError::InvalidValue {
                field: "rate",
                value: self.rate.clone(),
            });
        }
        let psize = parse_integer("psize", &self.psize)?;

        Ok(StreamSpec {
            class: self.class,
            transport: self.transport,
            rate,
            psize,
        })
    }
}

impl FromStr for StreamDescriptor {
    type Err = CbsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_integer(field: &'static str, value: &str) -> Result<u32> {
    value.parse::<u32>().map_err(|_| CbsError::InvalidValue {
        field,
        value: value.to_string(),
    })
}

/// Fully validated stream description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamSpec {
    pub class: SrClass,
    pub transport: Transport,
    /// Packets per second
    pub rate: u32,
    /// Payload size in bytes
    pub psize: u32,
}

impl StreamSpec {
    pub fn new(class: SrClass, transport: Transport, rate: u32, psize: u32) -> Self {
        Self {
            class,
            transport,
            rate,
            psize,
        }
    }
}

impl fmt::Display for StreamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = match self.class {
            SrClass::A => "a",
            SrClass::B => "b",
        };
        write!(
            f,
            "class={class},transport={},rate={},psize={}",
            self.transport, self.rate, self.psize
        )
    }
}
