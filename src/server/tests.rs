use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use super::router;
use crate::api::{DynAPI, ItemAPI, PointAPI, API};
use crate::entities::{Item, NewPoint, Point, PointFilter};
use crate::error::{not_found_error, unknown_item_error, Error};
use crate::uploads::{upload_url, Uploads};

const BOUNDARY: &str = "ecoleta-test-boundary";
pub(crate) const PUBLIC_URL: &str = "http://localhost:3333";

#[derive(Default)]
pub(crate) struct MemoryAPI {
    items: Vec<Item>,
    points: Mutex<Vec<Point>>,
}

impl MemoryAPI {
    pub(crate) fn seeded() -> Self {
        let items = ["Lâmpadas", "Pilhas e Baterias", "Papéis e Papelão"]
            .iter()
            .enumerate()
            .map(|(i, title)| Item {
                id: i as i32 + 1,
                title: title.to_string(),
                image_url: upload_url(PUBLIC_URL, &format!("{}.svg", i + 1)),
            })
            .collect();

        Self {
            items,
            ..Default::default()
        }
    }
}

/// Every present criterion must hold; `items` matches any listed id.
fn matches(filter: &PointFilter, point: &Point) -> bool {
    let city = filter.city.as_ref().map_or(true, |c| &point.city == c);
    let uf = filter.uf.as_ref().map_or(true, |u| point.uf.eq_ignore_ascii_case(u));
    let items = filter
        .items
        .as_ref()
        .map_or(true, |ids| ids.iter().any(|id| point.items.contains(id)));

    city && uf && items
}

#[async_trait]
impl ItemAPI for MemoryAPI {
    async fn list_items(&self) -> Result<Vec<Item>, Error> {
        Ok(self.items.clone())
    }
}

#[async_trait]
impl PointAPI for MemoryAPI {
    async fn list_points(&self, filter: PointFilter) -> Result<Vec<Point>, Error> {
        let points = self.points.lock().unwrap();

        Ok(points.iter().filter(|p| matches(&filter, p)).cloned().collect())
    }

    async fn create_point(&self, point: NewPoint) -> Result<Point, Error> {
        if let Some(missing) = point
            .items
            .iter()
            .find(|id| !self.items.iter().any(|item| item.id == **id))
        {
            return Err(unknown_item_error(*missing));
        }

        let mut points = self.points.lock().unwrap();
        let created = Point {
            id: points.len() as i32 + 1,
            name: point.name,
            email: point.email,
            whatsapp: point.whatsapp,
            latitude: point.coordinates.latitude,
            longitude: point.coordinates.longitude,
            uf: point.uf,
            city: point.city,
            image_url: point.image.map(|name| upload_url(PUBLIC_URL, &name)),
            items: point.items,
        };
        points.push(created.clone());

        Ok(created)
    }

    async fn find_point(&self, id: i32) -> Result<Point, Error> {
        let points = self.points.lock().unwrap();

        points
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| not_found_error("point"))
    }
}

impl API for MemoryAPI {}

struct TestApp {
    app: Router,
    uploads_dir: PathBuf,
}

impl TestApp {
    fn new(api: MemoryAPI) -> Self {
        let uploads_dir =
            std::env::temp_dir().join(format!("ecoleta-server-{}", rand::random::<u64>()));

        Self {
            app: router(Arc::new(api) as DynAPI, Uploads::new(&uploads_dir)),
            uploads_dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };

        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_form(&self, fields: &[(&str, &str)], images: &[(&str, &[u8])]) -> (StatusCode, Value) {
        let request = Request::post("/points")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(fields, images)))
            .unwrap();

        self.send(request).await
    }

    fn staged_files(&self) -> Vec<String> {
        match std::fs::read_dir(&self.uploads_dir) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => vec![],
        }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.uploads_dir);
    }
}

fn multipart_body(fields: &[(&str, &str)], images: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }

    for (file_name, bytes) in images {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn acme_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "ACME"),
        ("email", "a@acme.org"),
        ("whatsapp", "11999999999"),
        ("latitude", "-23.5"),
        ("longitude", "-46.6"),
        ("uf", "SP"),
        ("city", "São Paulo"),
        ("items", "1,2"),
    ]
}

fn with_field(field: &'static str, value: &'static str) -> Vec<(&'static str, &'static str)> {
    acme_fields()
        .into_iter()
        .map(|(k, v)| if k == field { (k, value) } else { (k, v) })
        .collect()
}

#[tokio::test]
async fn empty_catalog_lists_no_items() {
    let app = TestApp::new(MemoryAPI::default());

    let (status, body) = app.get("/items").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn lists_catalog_items_in_order() {
    let app = TestApp::new(MemoryAPI::seeded());

    let (status, body) = app.get("/items").await;

    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Lâmpadas", "Pilhas e Baterias", "Papéis e Papelão"]);
    assert_eq!(body[0]["image_url"], "http://localhost:3333/uploads/1.svg");
}

#[tokio::test]
async fn creates_a_point_with_an_image() {
    let app = TestApp::new(MemoryAPI::seeded());

    let (status, body) = app.post_form(&acme_fields(), &[("acme.png", b"png-bytes")]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["items"], serde_json::json!([1, 2]));
    assert_eq!(body["city"], "São Paulo");
    assert_eq!(body["latitude"], -23.5);

    let staged = app.staged_files();
    assert_eq!(staged.len(), 1);
    assert!(staged[0].ends_with("-acme.png"));
    assert_eq!(
        body["image_url"],
        format!("http://localhost:3333/uploads/{}", staged[0])
    );

    let (status, bytes) = app.get(&format!("/uploads/{}", staged[0])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, "png-bytes");
}

#[tokio::test]
async fn creates_a_point_without_an_image() {
    let app = TestApp::new(MemoryAPI::seeded());

    let (status, body) = app.post_form(&acme_fields(), &[]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["image_url"], Value::Null);
    assert!(app.staged_files().is_empty());
}

#[tokio::test]
async fn each_creation_gets_a_new_id() {
    let app = TestApp::new(MemoryAPI::seeded());

    let (_, first) = app.post_form(&acme_fields(), &[]).await;
    let (_, second) = app.post_form(&with_field("items", "3"), &[]).await;

    assert_ne!(first["id"], second["id"]);
    assert_eq!(second["items"], serde_json::json!([3]));
}

#[tokio::test]
async fn rejects_unknown_items_and_discards_the_upload() {
    let app = TestApp::new(MemoryAPI::seeded());

    let (status, body) = app
        .post_form(&with_field("items", "1,42"), &[("acme.png", b"png-bytes")])
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unknown item id: 42");
    assert!(app.staged_files().is_empty());
}

#[tokio::test]
async fn rejects_missing_fields_before_touching_storage() {
    let app = TestApp::new(MemoryAPI::seeded());
    let fields: Vec<_> = acme_fields().into_iter().filter(|(k, _)| *k != "name").collect();

    let (status, body) = app.post_form(&fields, &[("acme.png", b"png-bytes")]).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name is required");
    assert!(app.staged_files().is_empty());
}

#[tokio::test]
async fn rejects_a_second_image() {
    let app = TestApp::new(MemoryAPI::seeded());

    let (status, _) = app
        .post_form(&acme_fields(), &[("a.png", b"a"), ("b.png", b"b")])
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rejects_non_numeric_coordinates() {
    let app = TestApp::new(MemoryAPI::seeded());

    let (status, body) = app.post_form(&with_field("latitude", "south"), &[]).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "latitude must be a number");
}

#[tokio::test]
async fn looks_up_points_by_id() {
    let app = TestApp::new(MemoryAPI::seeded());
    app.post_form(&acme_fields(), &[]).await;

    let (status, body) = app.get("/points/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "ACME");

    let request = Request::post("/points/1").body(Body::empty()).unwrap();
    let (status, legacy) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(legacy, body);
}

#[tokio::test]
async fn unknown_point_is_not_found() {
    let app = TestApp::new(MemoryAPI::seeded());

    let (status, body) = app.get("/points/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "point not found");
    assert!(body.get("id").is_none());

    let request = Request::post("/points/99").body(Body::empty()).unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_point_id_is_a_json_bad_request() {
    let app = TestApp::new(MemoryAPI::seeded());

    for uri in ["/points/abc", "/points/99999999999"] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 101);
        assert_eq!(body["error"], "point id must be an integer");
    }
}

#[tokio::test]
async fn filters_listed_points() {
    let app = TestApp::new(MemoryAPI::seeded());
    app.post_form(&acme_fields(), &[]).await;
    app.post_form(&with_field("uf", "RJ"), &[]).await;
    app.post_form(&with_field("items", "3"), &[]).await;

    let (status, all) = app.get("/points").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, in_sp) = app.get("/points?uf=SP").await;
    assert_eq!(in_sp.as_array().unwrap().len(), 2);

    let (_, accepts_batteries) = app.get("/points?uf=SP&items=2").await;
    let ids: Vec<i64> = accepts_batteries
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1]);

    let (status, _) = app.get("/points?items=paper").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[test]
fn filter_matches_any_listed_item() {
    let point = Point {
        id: 1,
        name: "ACME".into(),
        email: "a@acme.org".into(),
        whatsapp: "11999999999".into(),
        latitude: -23.5,
        longitude: -46.6,
        uf: "SP".into(),
        city: "São Paulo".into(),
        image_url: None,
        items: vec![1, 2],
    };

    assert!(matches(&PointFilter::default(), &point));

    let by_uf_and_items = PointFilter {
        uf: Some("sp".into()),
        items: Some(vec![2, 5]),
        ..Default::default()
    };
    assert!(matches(&by_uf_and_items, &point));

    let other_item = PointFilter {
        items: Some(vec![3]),
        ..Default::default()
    };
    assert!(!matches(&other_item, &point));

    let other_city = PointFilter {
        city: Some("Campinas".into()),
        ..Default::default()
    };
    assert!(!matches(&other_city, &point));
}
