//! Scripted I2C bus for driver unit tests.
//!
//! Each expected transaction names the address, the bytes the driver must
//! write and the reply (read data or an error kind).

use std::collections::VecDeque;

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

struct Expect {
    addr: u8,
    write: Vec<u8>,
    reply: Result<Vec<u8>, ErrorKind>,
}

#[derive(Default)]
pub(crate) struct ScriptedBus {
    expected: VecDeque<Expect>,
}

impl ScriptedBus {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn write(mut self, addr: u8, bytes: &[u8]) -> Self {
        self.push(addr, bytes, Ok(Vec::new()));
        self
    }

    pub(crate) fn write_read(mut self, addr: u8, bytes: &[u8], reply: &[u8]) -> Self {
        self.push(addr, bytes, Ok(reply.to_vec()));
        self
    }

    pub(crate) fn read(mut self, addr: u8, reply: &[u8]) -> Self {
        self.push(addr, &[], Ok(reply.to_vec()));
        self
    }

    pub(crate) fn nack(mut self, addr: u8, bytes: &[u8]) -> Self {
        self.push(
            addr,
            bytes,
            Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
        );
        self
    }

    pub(crate) fn fail(mut self, addr: u8, bytes: &[u8]) -> Self {
        self.push(addr, bytes, Err(ErrorKind::Bus));
        self
    }

    pub(crate) fn is_done(&self) -> bool {
        self.expected.is_empty()
    }

    fn push(&mut self, addr: u8, write: &[u8], reply: Result<Vec<u8>, ErrorKind>) {
        self.expected.push_back(Expect {
            addr,
            write: write.to_vec(),
            reply,
        });
    }
}

impl ErrorType for ScriptedBus {
    type Error = ErrorKind;
}

impl I2c for ScriptedBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let exp = self
            .expected
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected transaction to {address:#04x}"));
        assert_eq!(address, exp.addr, "address");

        let mut written = Vec::new();
        for op in operations.iter() {
            if let Operation::Write(bytes) = op {
                written.extend_from_slice(bytes);
            }
        }
        assert_eq!(written, exp.write, "bytes written to {address:#04x}");

        let data = exp.reply?;
        let mut offset = 0;
        for op in operations.iter_mut() {
            if let Operation::Read(buf) = op {
                let n = buf.len();
                buf.copy_from_slice(&data[offset..offset + n]);
                offset += n;
            }
        }
        Ok(())
    }
}
