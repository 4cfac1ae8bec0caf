// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Showcases how a facade can hand a length-prefixed frame to a parser without letting the
//! parser read into the next frame.

use segbuf::{BufferFacade, ByteBuffer, HeapBuffer, ReadLimit, Result};

fn main() -> Result<()> {
    // Two frames, each prefixed with its length as a big-endian u16.
    let mut connection = HeapBuffer::with_capacity(64);
    connection.write_bytes(&[0, 5])?.write_bytes(b"hello")?;
    connection.write_bytes(&[0, 7])?.write_bytes(b"goodbye")?;

    while connection.readable_len() > 0 {
        let mut prefix = [0_u8; 2];
        connection.read_bytes(&mut prefix)?;

        // The facade borrows the connection buffer, so whatever the parser consumes is consumed
        // from the connection as well.
        let mut frame = BufferFacade::with_overrides(&mut connection, ReadLimit::new(u16::from_be_bytes(prefix).into()));
        let words = parse_words(&mut frame)?;

        println!("frame: {words:?}");
    }

    Ok(())
}

/// A greedy parser that consumes everything readable. Without the limit it would happily
/// consume the following frames, too.
fn parse_words(buffer: &mut impl ByteBuffer) -> Result<Vec<String>> {
    let text = String::from_utf8_lossy(buffer.readable()).into_owned();
    buffer.advance(buffer.readable_len())?;

    Ok(text.split_whitespace().map(str::to_owned).collect())
}
