/*!
Input and output endpoints: a file path, or '-' for stdin/stdout
*/

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    fn read_raw(&self) -> io::Result<Vec<u8>> {
        match self {
            Input::Stdin => {
                let mut buffer = Vec::new();
                io::stdin().lock().read_to_end(&mut buffer)?;
                Ok(buffer)
            }
            Input::File(path) => std::fs::read(path),
        }
    }

    /// Reads the whole input, decoding it from hex text if `hex` is set.
    /// Whitespace between hex digits is ignored.
    pub fn read_bytes(&self, hex: bool) -> anyhow::Result<Vec<u8>> {
        let raw = self.read_raw()?;
        if !hex {
            return Ok(raw);
        }
        let digits: Vec<u8> = raw
            .into_iter()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        Ok(hex::decode(digits)?)
    }
}

impl FromStr for Input {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "-" => Input::Stdin,
            path => Input::File(path.into()),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub enum Output {
    #[default]
    Stdout,
    File(PathBuf),
}

impl Output {
    pub fn write_str(&self, text: &str) -> io::Result<()> {
        match self {
            Output::Stdout => io::stdout().lock().write_all(text.as_bytes()),
            Output::File(path) => std::fs::write(path, text),
        }
    }
}

impl FromStr for Output {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "" | "-" => Output::Stdout,
            path => Output::File(path.into()),
        })
    }
}
