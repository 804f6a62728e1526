//! Integration tests for the directions and geocoding clients (wiremock-based)

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use metro_directions::{
    Coordinate, DirectionsClient, GeocodingClient, GeocodingError, GoogleDirectionsClient,
    GoogleGeocodingClient, MapsConfig, StepKind,
};

fn config_for_mock(base_url: &str) -> MapsConfig {
    MapsConfig {
        base_url: base_url.to_string(),
        ..MapsConfig::for_testing()
    }
}

fn charminar() -> Coordinate {
    Coordinate::new(17.3616, 78.4747).unwrap()
}

fn hitech_city() -> Coordinate {
    Coordinate::new(17.4435, 78.3772).unwrap()
}

fn transit_step(vehicle: &str, line: &str, seconds: u32) -> String {
    format!(
        r#"{{
            "travel_mode": "TRANSIT",
            "html_instructions": "{vehicle} towards <b>Hitech City</b>",
            "distance": {{ "text": "4.1 km", "value": 4100 }},
            "duration": {{ "text": "{} mins", "value": {seconds} }},
            "polyline": {{ "points": "_p~iF~ps|U_ulLnnqC" }},
            "transit_details": {{
                "line": {{
                    "short_name": "{line}",
                    "name": "{line} corridor",
                    "vehicle": {{ "type": "{vehicle}", "name": "{vehicle}" }}
                }},
                "departure_stop": {{ "name": "Koti" }},
                "arrival_stop": {{ "name": "Ameerpet" }},
                "departure_time": {{ "text": "10:05 AM", "value": 1767153900 }},
                "arrival_time": {{ "text": "10:25 AM", "value": 1767155100 }},
                "num_stops": 7
            }}
        }}"#,
        seconds / 60
    )
}

fn walk_step(meters: u32) -> String {
    format!(
        r#"{{
            "travel_mode": "WALKING",
            "html_instructions": "Walk to <b>the stop</b>",
            "distance": {{ "text": "{meters} m", "value": {meters} }},
            "duration": {{ "text": "4 mins", "value": 240 }},
            "polyline": {{ "points": "_p~iF~ps|U" }}
        }}"#
    )
}

fn transit_route(summary: &str, duration_seconds: u32, steps: &[String]) -> String {
    format!(
        r#"{{
            "summary": "{summary}",
            "overview_polyline": {{ "points": "_p~iF~ps|U_ulLnnqC_mqNvxq`@" }},
            "legs": [{{
                "duration": {{ "text": "{} mins", "value": {duration_seconds} }},
                "distance": {{ "text": "9.2 km", "value": 9200 }},
                "departure_time": {{ "text": "10:00 AM", "value": 1767153600 }},
                "arrival_time": {{ "text": "10:34 AM", "value": 1767155640 }},
                "steps": [{}]
            }}]
        }}"#,
        duration_seconds / 60,
        steps.join(",")
    )
}

fn directions_body(routes: &[String]) -> String {
    format!(r#"{{ "status": "OK", "routes": [{}] }}"#, routes.join(","))
}

#[tokio::test]
async fn test_transit_routes_normalized_and_sorted() {
    let server = MockServer::start().await;

    let slower = transit_route(
        "Via bus",
        2040,
        &[
            walk_step(300),
            transit_step("BUS", "10H", 1200),
            walk_step(900),
        ],
    );
    let faster = transit_route(
        "Via metro",
        1500,
        &[
            walk_step(200),
            transit_step("BUS", "86", 600),
            walk_step(150),
            transit_step("SUBWAY", "Red Line", 500),
        ],
    );

    Mock::given(method("GET"))
        .and(path("/directions/json"))
        .and(query_param("mode", "transit"))
        .and(query_param("transit_mode", "bus|rail|subway"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(directions_body(&[slower, faster])),
        )
        .mount(&server)
        .await;

    let config = config_for_mock(&server.uri());
    let client = GoogleDirectionsClient::new(&config).unwrap();

    let routes = client
        .transit_routes(charminar(), hitech_city(), None)
        .await
        .unwrap();

    assert_eq!(routes.len(), 2);

    // Fastest first
    assert_eq!(routes[0].summary, "Via metro");
    assert_eq!(routes[0].duration_seconds, 1500);
    assert_eq!(routes[1].duration_seconds, 2040);

    // Derived aggregates
    assert_eq!(routes[0].transfer_count, 1);
    assert_eq!(routes[1].transfer_count, 0);
    assert_eq!(routes[1].walking_distance_text, "1.2km");

    // Step classification and instruction stripping
    let steps = &routes[0].steps;
    assert_eq!(steps[0].kind, StepKind::Walk);
    assert_eq!(steps[1].kind, StepKind::Bus);
    assert_eq!(steps[3].kind, StepKind::Metro);
    assert_eq!(steps[0].instruction, "Walk to the stop");
    assert_eq!(
        steps[3].transit.as_ref().unwrap().line_label,
        "Red Line"
    );

    // Overview geometry decodes lazily
    assert_eq!(routes[0].path().unwrap().len(), 3);
}

#[tokio::test]
async fn test_transit_zero_results_is_no_routes_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/directions/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{ "status": "ZERO_RESULTS", "routes": [] }"#),
        )
        .mount(&server)
        .await;

    let config = config_for_mock(&server.uri());
    let client = GoogleDirectionsClient::new(&config).unwrap();

    let err = client
        .transit_routes(charminar(), hitech_city(), None)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "No transit routes found");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_transit_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/directions/json"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .mount(&server)
        .await;

    let config = config_for_mock(&server.uri());
    let client = GoogleDirectionsClient::new(&config).unwrap();

    let err = client
        .transit_routes(charminar(), hitech_city(), None)
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    assert!(err.to_string().contains("30"));
}

#[tokio::test]
async fn test_transit_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/directions/json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = config_for_mock(&server.uri());
    let client = GoogleDirectionsClient::new(&config).unwrap();

    let result = client
        .transit_routes(charminar(), hitech_city(), None)
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_transit_request_denied() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/directions/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{ "status": "REQUEST_DENIED", "routes": [], "error_message": "Invalid API key" }"#,
        ))
        .mount(&server)
        .await;

    let config = config_for_mock(&server.uri());
    let client = GoogleDirectionsClient::new(&config).unwrap();

    let err = client
        .transit_routes(charminar(), hitech_city(), None)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("REQUEST_DENIED"));
    assert!(err.to_string().contains("Invalid API key"));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_walking_route() {
    let server = MockServer::start().await;

    let route = transit_route("", 900, &[walk_step(400), walk_step(800)]);

    Mock::given(method("GET"))
        .and(path("/directions/json"))
        .and(query_param("mode", "walking"))
        .respond_with(ResponseTemplate::new(200).set_body_string(directions_body(&[route])))
        .mount(&server)
        .await;

    let config = config_for_mock(&server.uri());
    let client = GoogleDirectionsClient::new(&config).unwrap();

    let route = client
        .walking_route(charminar(), hitech_city())
        .await
        .unwrap();

    assert_eq!(route.summary, "Walking route");
    assert_eq!(route.transfer_count, 0);
    assert_eq!(route.walking_distance_text, route.distance);
    assert!(route.steps.iter().all(|s| s.kind == StepKind::Walk));
}

#[tokio::test]
async fn test_geocode_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .and(query_param("address", "Charminar"))
        .and(query_param("components", "country:IN"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{
                "status": "OK",
                "results": [{
                    "formatted_address": "Charminar, Hyderabad, Telangana, India",
                    "geometry": { "location": { "lat": 17.3616, "lng": 78.4747 } }
                }]
            }"#,
        ))
        .mount(&server)
        .await;

    let config = config_for_mock(&server.uri());
    let client = GoogleGeocodingClient::new(&config).unwrap();

    let resolved = client.geocode("Charminar").await.unwrap();
    assert!(resolved.formatted.starts_with("Charminar"));
    assert!((resolved.coordinates.lat - 17.3616).abs() < 1e-9);
}

#[tokio::test]
async fn test_geocode_cache_hit_skips_second_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{
                "status": "OK",
                "results": [{
                    "formatted_address": "Koti, Hyderabad",
                    "geometry": { "location": { "lat": 17.3833, "lng": 78.4800 } }
                }]
            }"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let config = MapsConfig {
        geocode_cache_ttl_hours: 1,
        ..config_for_mock(&server.uri())
    };
    let client = GoogleGeocodingClient::new(&config).unwrap();

    let first = client.geocode("Koti").await.unwrap();
    let second = client.geocode("koti").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_geocode_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{ "status": "ZERO_RESULTS", "results": [] }"#),
        )
        .mount(&server)
        .await;

    let config = config_for_mock(&server.uri());
    let client = GoogleGeocodingClient::new(&config).unwrap();

    let err = client.geocode("nowhere at all").await.unwrap_err();
    assert!(matches!(err, GeocodingError::AddressNotFound(_)));
}

#[tokio::test]
async fn test_geocode_empty_address() {
    let config = MapsConfig::for_testing();
    let client = GoogleGeocodingClient::new(&config).unwrap();

    let err = client.geocode("   ").await.unwrap_err();
    assert!(matches!(err, GeocodingError::InvalidQuery(_)));
}

#[tokio::test]
async fn test_reverse_geocode_keeps_input_coordinates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .and(query_param("latlng", "17.3616,78.4747"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{
                "status": "OK",
                "results": [{
                    "formatted_address": "Charminar Rd, Hyderabad",
                    "geometry": { "location": { "lat": 17.36165, "lng": 78.47468 } }
                }]
            }"#,
        ))
        .mount(&server)
        .await;

    let config = config_for_mock(&server.uri());
    let client = GoogleGeocodingClient::new(&config).unwrap();

    let resolved = client.reverse_geocode(charminar()).await.unwrap();
    assert_eq!(resolved.formatted, "Charminar Rd, Hyderabad");
    assert!((resolved.coordinates.lat - 17.3616).abs() < 1e-9);
}

#[tokio::test]
async fn test_place_autocomplete() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/autocomplete/json"))
        .and(query_param("input", "Charmi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{
                "status": "OK",
                "predictions": [{
                    "description": "Charminar, Hyderabad",
                    "place_id": "ChIJ5ejqPK2ZyzsR0ZuRcWSriJ8",
                    "structured_formatting": {
                        "main_text": "Charminar",
                        "secondary_text": "Hyderabad"
                    }
                }]
            }"#,
        ))
        .mount(&server)
        .await;

    let config = config_for_mock(&server.uri());
    let client = GoogleGeocodingClient::new(&config).unwrap();

    let predictions = client.place_autocomplete("Charmi").await.unwrap();
    assert_eq!(predictions.len(), 1);
    assert_eq!(predictions[0].main_text, "Charminar");
    assert_eq!(predictions[0].secondary_text, "Hyderabad");
}

#[tokio::test]
async fn test_place_autocomplete_zero_results_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/autocomplete/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{ "status": "ZERO_RESULTS", "predictions": [] }"#),
        )
        .mount(&server)
        .await;

    let config = config_for_mock(&server.uri());
    let client = GoogleGeocodingClient::new(&config).unwrap();

    let predictions = client.place_autocomplete("zzzzzz").await.unwrap();
    assert!(predictions.is_empty());
}

#[tokio::test]
async fn test_place_details() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/details/json"))
        .and(query_param("place_id", "ChIJ5ejqPK2ZyzsR0ZuRcWSriJ8"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{
                "status": "OK",
                "result": {
                    "formatted_address": "Charminar, Hyderabad",
                    "geometry": { "location": { "lat": 17.3616, "lng": 78.4747 } }
                }
            }"#,
        ))
        .mount(&server)
        .await;

    let config = config_for_mock(&server.uri());
    let client = GoogleGeocodingClient::new(&config).unwrap();

    let resolved = client
        .place_details("ChIJ5ejqPK2ZyzsR0ZuRcWSriJ8")
        .await
        .unwrap();
    assert_eq!(resolved.formatted, "Charminar, Hyderabad");
}

#[tokio::test]
async fn test_place_details_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/details/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{ "status": "NOT_FOUND" }"#),
        )
        .mount(&server)
        .await;

    let config = config_for_mock(&server.uri());
    let client = GoogleGeocodingClient::new(&config).unwrap();

    let err = client.place_details("bogus").await.unwrap_err();
    assert!(matches!(err, GeocodingError::AddressNotFound(_)));
}
