//! Minimal MQTT 3.1.1 broker for tests: answers CONNECT and PINGREQ and
//! records every PUBLISH it receives.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};

const CONNECT: u8 = 1;
const PUBLISH: u8 = 3;
const PINGREQ: u8 = 12;
const DISCONNECT: u8 = 14;

/// CONNACK return code for "not authorized"
pub const REFUSED_NOT_AUTHORIZED: u8 = 0x05;

#[derive(Debug, Clone)]
pub struct Message {
    pub topic: String,
    pub payload: String,
    pub qos: u8,
    pub received_at: Instant,
}

/// How a connection is treated after its CONNECT arrives
#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Accept,
    Refuse,
    /// CONNACK, then close the socket
    HangUp,
}

pub struct MockBroker {
    pub addr: SocketAddr,
    messages: mpsc::UnboundedReceiver<Message>,
}

impl MockBroker {
    pub async fn accepting() -> io::Result<Self> {
        Self::start(Mode::Accept).await
    }

    pub async fn refusing() -> io::Result<Self> {
        Self::start(Mode::Refuse).await
    }

    pub async fn hanging_up() -> io::Result<Self> {
        Self::start(Mode::HangUp).await
    }

    /// Accepting broker served from its own thread and runtime, so it keeps
    /// running after the caller's runtime is dropped.
    pub fn accepting_detached() -> io::Result<Self> {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        let (tx, messages) = mpsc::unbounded_channel();

        std::thread::spawn(move || -> io::Result<()> {
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
            rt.block_on(async move {
                let listener = TcpListener::from_std(listener)?;
                accept_loop(listener, Mode::Accept, tx).await;
                Ok(())
            })
        });

        Ok(Self { addr, messages })
    }

    async fn start(mode: Mode) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (tx, messages) = mpsc::unbounded_channel();

        tokio::spawn(accept_loop(listener, mode, tx));

        Ok(Self { addr, messages })
    }

    pub async fn next_message(&mut self, wait: Duration) -> Option<Message> {
        timeout(wait, self.messages.recv()).await.ok().flatten()
    }

    pub fn try_next_message(&mut self) -> Option<Message> {
        self.messages.try_recv().ok()
    }
}

async fn accept_loop(listener: TcpListener, mode: Mode, tx: mpsc::UnboundedSender<Message>) {
    while let Ok((stream, _)) = listener.accept().await {
        tokio::spawn(serve(stream, mode, tx.clone()));
    }
}

async fn serve(mut stream: TcpStream, mode: Mode, tx: mpsc::UnboundedSender<Message>) -> io::Result<()> {
    loop {
        let header = match stream.read_u8().await {
            Ok(b) => b,
            Err(_) => return Ok(()),
        };
        let len = read_remaining_length(&mut stream).await?;
        let mut body = vec![0u8; len];
        stream.read_exact(&mut body).await?;

        match header >> 4 {
            CONNECT => {
                let code = if mode == Mode::Refuse { REFUSED_NOT_AUTHORIZED } else { 0x00 };
                stream.write_all(&[0x20, 0x02, 0x00, code]).await?;
                if mode != Mode::Accept {
                    stream.shutdown().await?;
                    return Ok(());
                }
            }
            PUBLISH => {
                let qos = (header >> 1) & 0x03;
                let topic_len = u16::from_be_bytes([body[0], body[1]]) as usize;
                let topic = String::from_utf8_lossy(&body[2..2 + topic_len]).into_owned();
                let mut offset = 2 + topic_len;
                if qos > 0 {
                    offset += 2;
                }
                let payload = String::from_utf8_lossy(&body[offset..]).into_owned();
                let _ = tx.send(Message {
                    topic,
                    payload,
                    qos,
                    received_at: Instant::now(),
                });
            }
            PINGREQ => stream.write_all(&[0xD0, 0x00]).await?,
            DISCONNECT => return Ok(()),
            _ => {}
        }
    }
}

async fn read_remaining_length(stream: &mut TcpStream) -> io::Result<usize> {
    let mut value = 0usize;
    let mut shift = 0;
    loop {
        let byte = stream.read_u8().await?;
        value |= ((byte & 0x7F) as usize) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
        if shift > 21 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "malformed remaining length"));
        }
    }
}
