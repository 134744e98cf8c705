use bytes::Bytes;
use std::fs::File;
use std::io::{self, Read, Write};

/// Body of a dispatched response.
///
/// Either a buffer held in memory or an open file that is streamed on [`write_to`](ResponseBody::write_to).
#[derive(Debug)]
pub struct ResponseBody {
    inner: Kind,
}

#[derive(Debug)]
enum Kind {
    Once(Option<Bytes>),
    File(File),
}

impl ResponseBody {
    pub fn empty() -> Self {
        Self { inner: Kind::Once(None) }
    }

    pub fn once(bytes: Bytes) -> Self {
        Self { inner: Kind::Once(Some(bytes)) }
    }

    pub fn file(file: File) -> Self {
        Self { inner: Kind::File(file) }
    }

    /// Returns true if the body is known to carry no bytes.
    pub fn is_empty(&self) -> bool {
        match &self.inner {
            Kind::Once(option_bytes) => option_bytes.as_ref().is_none_or(Bytes::is_empty),
            Kind::File(_) => false,
        }
    }

    /// Streams the body into `writer`, returning the number of bytes written.
    pub fn write_to<W: Write + ?Sized>(self, writer: &mut W) -> io::Result<u64> {
        match self.inner {
            Kind::Once(None) => Ok(0),
            Kind::Once(Some(bytes)) => {
                writer.write_all(&bytes)?;
                Ok(bytes.len() as u64)
            }
            Kind::File(mut file) => io::copy(&mut file, writer),
        }
    }

    /// Collects the whole body into memory.
    pub fn into_bytes(self) -> io::Result<Bytes> {
        match self.inner {
            Kind::Once(option_bytes) => Ok(option_bytes.unwrap_or_default()),
            Kind::File(mut file) => {
                let mut buf = Vec::new();
                file.read_to_end(&mut buf)?;
                Ok(Bytes::from(buf))
            }
        }
    }
}

impl From<String> for ResponseBody {
    fn from(value: String) -> Self {
        Self::once(Bytes::from(value))
    }
}

impl From<&'static str> for ResponseBody {
    fn from(value: &'static str) -> Self {
        if value.is_empty() {
            Self::empty()
        } else {
            Self::once(Bytes::from_static(value.as_bytes()))
        }
    }
}

impl From<Vec<u8>> for ResponseBody {
    fn from(value: Vec<u8>) -> Self {
        Self::once(Bytes::from(value))
    }
}

impl From<Bytes> for ResponseBody {
    fn from(value: Bytes) -> Self {
        Self::once(value)
    }
}

impl From<()> for ResponseBody {
    fn from((): ()) -> Self {
        Self::empty()
    }
}

impl From<File> for ResponseBody {
    fn from(file: File) -> Self {
        Self::file(file)
    }
}
