use std::io::{self, ErrorKind, Read};

// byte-at-a-time reader that can give bytes back. the scanner reads past the end
// of a token to find out where the token ends, then pushes the overshoot back
pub struct ByteStream<R: Read> {
    reader: R,
    // stack: the next byte to hand out is at the end
    pushback: Vec<u8>,
    position: usize,
}

impl<R: Read> ByteStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pushback: Vec::new(),
            position: 0,
        }
    }

    // offset of the next byte from the start of the stream
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn next_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(byte) = self.pushback.pop() {
            self.position += 1;
            return Ok(Some(byte));
        }

        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.position += 1;
                    return Ok(Some(buf[0]));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    // `bytes` must be the most recently read bytes, in the order they were read
    pub fn unread(&mut self, bytes: &[u8]) {
        debug_assert!(bytes.len() <= self.position);
        self.pushback.extend(bytes.iter().rev());
        self.position -= bytes.len();
    }
}
