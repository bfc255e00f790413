use std::cell::{Cell, RefCell};

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::builder::RecordBuilder;
use crate::error::{GeocodeError, LogoError};
use crate::geocode::Geocoder;
use crate::logo::LogoConverter;
use crate::record::{Coordinates, LatLon, Record};

/// Client that ignores proxy env vars so loopback requests stay local.
pub fn plain_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Answer exactly one HTTP request with `status` and `body`; returns a URL to hit.
pub async fn serve_once(status: &'static str, body: Vec<u8>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        let head = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            body.len()
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(&body).await.unwrap();
        let _ = socket.shutdown().await;
    });

    format!("http://{}/resource", addr)
}

// ── Fake collaborators ──

pub const MADRID: Coordinates = Coordinates {
    lat: 40.4167047,
    lon: -3.7035825,
};

pub enum FakeGeocoder {
    Found(Coordinates),
    Nothing,
    Down,
}

pub struct CountingGeocoder {
    pub mode: FakeGeocoder,
    pub calls: Cell<usize>,
}

impl Geocoder for CountingGeocoder {
    async fn geocode(&self, _query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        self.calls.set(self.calls.get() + 1);
        match self.mode {
            FakeGeocoder::Found(c) => Ok(Some(c)),
            FakeGeocoder::Nothing => Ok(None),
            FakeGeocoder::Down => Err(GeocodeError::Malformed("service unavailable".into())),
        }
    }
}

/// Pretends to convert; records every call. `status` makes every fetch fail.
#[derive(Default)]
pub struct FakeLogos {
    pub status: Option<u16>,
    pub calls: RefCell<Vec<(String, String)>>,
    pub discarded: RefCell<Vec<String>>,
}

impl LogoConverter for FakeLogos {
    async fn convert(&self, url: &str, file_name: &str) -> Result<(), LogoError> {
        self.calls
            .borrow_mut()
            .push((url.to_string(), file_name.to_string()));
        match self.status {
            Some(code) => Err(LogoError::Status(code)),
            None => Ok(()),
        }
    }

    fn discard(&self, file_name: &str) -> std::io::Result<()> {
        self.discarded.borrow_mut().push(file_name.to_string());
        Ok(())
    }
}

pub fn builder(mode: FakeGeocoder, logos: FakeLogos) -> RecordBuilder<CountingGeocoder, FakeLogos> {
    RecordBuilder::new(
        CountingGeocoder {
            mode,
            calls: Cell::new(0),
        },
        logos,
    )
}

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}.md", name)).unwrap()
}

pub fn existing(id: &str, name: &str, thumbnail: &str) -> Record {
    Record {
        id: id.into(),
        name: name.into(),
        status: "Activa".into(),
        last_reviewed: "01/01/2024".into(),
        community_type: "Meetup".into(),
        event_format: "Online".into(),
        location: "Madrid".into(),
        topics: String::new(),
        contact_info: String::new(),
        community_url: "https://example.org".into(),
        thumbnail_url: thumbnail.into(),
        lat_lon: LatLon::default(),
        extra: serde_json::Map::new(),
    }
}
