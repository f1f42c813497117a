use std::io::{Cursor, Write};

use chrono::NaiveDate;
use rgb::RGB8;

use crate::error::PropertyError;
use crate::source::MemorySource;
use crate::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn basic() -> Feed {
    init_logger();
    Feed::from_path("fixtures/basic").expect("impossible to read feed")
}

/// The smallest feed with every required table
fn minimal() -> MemorySource {
    MemorySource::new()
        .with_table(
            "agency.txt",
            "agency_id,agency_name,agency_url,agency_timezone\nA,Agency,http://a.example,Europe/Paris\n",
        )
        .with_table("routes.txt", "route_id,route_short_name,route_type\nR1,1,3\n")
        .with_table(
            "calendar_dates.txt",
            "service_id,date,exception_type\nS1,20240101,1\n",
        )
        .with_table(
            "stops.txt",
            "stop_id,stop_name,stop_lat,stop_lon\nS,Central,48.8,2.3\n",
        )
        .with_table("trips.txt", "trip_id,route_id,service_id\nT1,R1,S1\n")
        .with_table(
            "stop_times.txt",
            "trip_id,stop_id,stop_sequence,arrival_time,departure_time\nT1,S,1,08:00:00,08:00:00\n",
        )
}

fn zipped_fixture() -> Vec<u8> {
    zipped_fixture_with(&[])
}

/// The fixture feed as an archive, with some more files
fn zipped_fixture_with(extra: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let mut paths: Vec<_> = std::fs::read_dir("fixtures/basic")
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    paths.sort();
    for path in paths {
        let name = format!("gtfs/{}", path.file_name().unwrap().to_str().unwrap());
        writer
            .start_file(name, zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(&std::fs::read(&path).unwrap()).unwrap();
    }
    for (name, content) in extra {
        writer
            .start_file(format!("gtfs/{}", name), zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[test]
fn read_agencies() {
    let feed = basic();
    assert_eq!(1, feed.agencies.len());
    let agency = feed.get_agency("1").unwrap();
    assert_eq!(Some("BIBUS"), agency.name());
    assert_eq!(Some("http://www.bibus.fr"), agency.url());
    assert_eq!(Some(chrono_tz::Europe::Paris), agency.timezone());
    assert_eq!(Some("1"), feed.default_agency_id.as_deref());
}

#[test]
fn read_routes() {
    let feed = basic();
    assert_eq!(3, feed.routes.len());
    let route = feed.get_route("1").unwrap();
    assert_eq!(RouteType::Bus, route.route_type());
    assert_eq!(RGB8::new(0, 0, 0), route.color());
    assert_eq!(RGB8::new(255, 255, 255), route.text_color());
    assert_eq!(Some(1), route.sort_order());

    let default_colors = feed.get_route("default_colors").unwrap();
    assert_eq!(RGB8::new(255, 255, 255), default_colors.color());
    assert_eq!(RGB8::new(0, 0, 0), default_colors.text_color());
    // the route does not give its agency and gets the only one
    assert_eq!(Some("1"), default_colors.agency_id());

    assert_eq!(
        RouteType::Other(42),
        feed.get_route("invalid_type").unwrap().route_type()
    );
}

#[test]
fn read_calendar() {
    let feed = basic();
    assert_eq!(2, feed.calendar.len());
    let (calendar, dates) = feed.get_calendar("service1").unwrap();
    let calendar = calendar.unwrap();
    assert!(!calendar.monday());
    assert!(calendar.saturday());
    assert_eq!(dates.len(), 1);
    assert_eq!(Some(Exception::Deleted), dates[0].exception_type());

    // service2 only exists through its exceptions
    let (calendar, dates) = feed.get_calendar("service2").unwrap();
    assert!(calendar.is_none());
    assert_eq!(Some(Exception::Added), dates[0].exception_type());

    let first_of_january = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap();
    assert!(!feed.calendar.runs_on("service1", first_of_january));
    assert!(feed
        .calendar
        .runs_on("service1", NaiveDate::from_ymd_opt(2017, 1, 7).unwrap()));
    assert_eq!(
        vec![6, 7, 13, 14],
        feed.trip_days("service1", first_of_january)
    );
    assert_eq!(vec![1], feed.trip_days("service2", first_of_january));
}

#[test]
fn read_stops() {
    let feed = basic();
    assert_eq!(5, feed.stops.len());
    assert_eq!(
        LocationType::StopArea,
        feed.get_stop("stop1").unwrap().location_type()
    );
    let stop2 = feed.get_stop("stop2").unwrap();
    assert_eq!(LocationType::StopPoint, stop2.location_type());
    assert_eq!(Some(48.796_058), stop2.latitude());
    assert_eq!(Some("stop1"), stop2.parent_station());
    assert_eq!(
        LocationType::StopPoint,
        feed.get_stop("stop4").unwrap().location_type()
    );
    assert_eq!(Some("Other stop"), feed.get_stop("stop5").unwrap().name());
    assert!(matches!(feed.get_stop("stop6"), Err(Error::ReferenceError(_))));
}

#[test]
fn read_trips_and_stop_times() {
    let feed = basic();
    assert_eq!(2, feed.trips.len());
    assert_eq!(Some("A_shp"), feed.get_trip("trip1").unwrap().shape_id());

    assert_eq!(5, feed.stop_times.len());
    let stop_times = feed.stop_times_for_trip("trip1");
    assert_eq!(3, stop_times.len());
    assert_eq!(PickupDropOffType::Regular, stop_times[0].pickup_type());
    assert_eq!(PickupDropOffType::NotAvailable, stop_times[0].drop_off_type());
    assert_eq!(PickupDropOffType::ArrangeByPhone, stop_times[1].pickup_type());
    assert_eq!(PickupDropOffType::Unknown(-999), stop_times[2].drop_off_type());
    assert_eq!(TimepointType::Exact, stop_times[0].timepoint());
    assert_eq!(TimepointType::Approximate, stop_times[1].timepoint());

    // the trip runs past midnight
    let (start, end) = feed.trip_span("trip1").unwrap();
    assert_eq!("23:50:00", start.to_string());
    assert_eq!("24:05:00", end.to_string());

    // trip2 first stop has only a departure, its last only an arrival
    let (start, end) = feed.trip_span("trip2").unwrap();
    assert_eq!(ServiceTime::from_hms(8, 0, 0), Some(start));
    assert_eq!(ServiceTime::from_hms(8, 30, 0), Some(end));

    // stop sequence 7 falls between 2 and 10
    assert_eq!(
        Some(2),
        feed.stop_times.floor("trip1", 7).map(|st| st.stop_sequence())
    );
}

#[test]
fn read_frequencies_and_shapes() {
    let feed = basic();
    let frequencies = feed.frequencies.with_first_key("trip1");
    assert_eq!(1, frequencies.len());
    assert_eq!(19800, frequencies[0].start_time().as_secs());
    assert_eq!(Some(300), frequencies[0].headway_secs());

    let shape = feed.shape("A_shp");
    assert_eq!(3, shape.len());
    assert_eq!(Some(37.61956), shape[0].latitude());
    assert_eq!(Some(-122.48161), shape[0].longitude());
    assert_eq!(
        Some(6.831),
        feed.shapes.floor("A_shp", 10).and_then(|p| p.dist_traveled())
    );
}

#[test]
fn read_fares() {
    let feed = basic();
    assert_eq!(1, feed.fare_attributes.len());
    let fare = feed.get_fare_attribute("50").unwrap();
    assert_eq!(Some(1.5), fare.price());
    assert_eq!(Some("EUR"), fare.currency());
    assert_eq!(Some(PaymentMethod::Aboard), fare.payment_method());
    assert_eq!(Transfers::Unlimited, fare.transfers());
    assert_eq!(Some("1"), fare.agency_id());
    assert_eq!(Some(chrono::Duration::seconds(3600)), fare.transfer_duration());
    assert_eq!(1, feed.fare_rules.len());
    assert_eq!(Some("1"), feed.fare_rules[0].route_id());
}

#[test]
fn read_transfers_and_pathways() {
    let feed = basic();
    assert_eq!(2, feed.transfers.len());
    let from_stop3 = feed
        .transfers
        .iter()
        .find(|t| t.from_stop_id() == Some("stop3"))
        .unwrap();
    assert_eq!(Some("stop5"), from_stop3.to_stop_id());
    assert_eq!(TransferType::Recommended, from_stop3.transfer_type());
    assert_eq!(
        Some(chrono::Duration::seconds(60)),
        from_stop3.min_transfer_time()
    );
    let from_stop1 = feed
        .transfers
        .iter()
        .find(|t| t.from_stop_id() == Some("stop1"))
        .unwrap();
    assert_eq!(TransferType::Impossible, from_stop1.transfer_type());

    let pathway = feed.pathways.get("pathway1").unwrap();
    assert_eq!(Some(PathwayMode::Walkway), pathway.mode());
    assert!(!pathway.is_bidirectional());
}

#[test]
fn read_feed_info_and_files() {
    let feed = basic();
    assert_eq!(1, feed.feed_info.len());
    assert_eq!(Some("SNCF"), feed.feed_info[0].publisher_name());
    assert_eq!(
        NaiveDate::from_ymd_opt(2017, 1, 15),
        feed.feed_info[0].end_date()
    );
    assert!(feed.quarantine.is_empty());
    assert!(feed.sha256.is_none());
    assert!(feed.files.contains(&"extra_notes.txt".to_owned()));

    // tables that are not modeled are still reachable
    let notes: Vec<_> = feed
        .source()
        .rows("extra_notes")
        .unwrap()
        .map(Result::unwrap)
        .collect();
    assert_eq!(1, notes.len());
    assert_eq!(("note_id".to_owned(), "n1".to_owned()), notes[0][0]);
    feed.log_stats();
}

#[test]
fn read_from_archive() {
    init_logger();
    let feed = Feed::from_reader(Cursor::new(zipped_fixture())).unwrap();
    assert_eq!(5, feed.stops.len());
    assert_eq!(3, feed.routes.len());
    assert_eq!(5, feed.stop_times.len());
    assert_eq!(64, feed.sha256.as_ref().map(String::len).unwrap_or_default());
    assert!(feed.files.contains(&"gtfs/stops.txt".to_owned()));
}

#[test]
fn strict_reading_quarantines_invalid_rows() {
    init_logger();
    let feed = FeedReader::default()
        .strict(true)
        .read("fixtures/basic")
        .unwrap();
    assert_eq!(1, feed.quarantine.len());
    let unparsed = &feed.quarantine[0];
    assert_eq!("stop_times", unparsed.table);
    assert_eq!(Some("10"), unparsed.properties.get("stop_sequence"));
    assert_eq!(
        PropertyError::InvalidEnumValue {
            field: "drop_off_type".to_owned(),
            value: "-999".to_owned()
        },
        unparsed.error
    );
    assert_eq!(4, feed.stop_times.len());
    let (_, end) = feed.trip_span("trip1").unwrap();
    assert_eq!("23:58:00", end.to_string());

    let json = serde_json::to_value(unparsed).unwrap();
    assert_eq!("stop_times", json["table"]);
    assert_eq!("trip1", json["properties"]["trip_id"]);
}

#[test]
fn strict_reading_without_quarantine_fails() {
    init_logger();
    let err = FeedReader::default()
        .strict(true)
        .quarantine(false)
        .read("fixtures/basic")
        .unwrap_err();
    match err {
        Error::InvalidRow { table, source } => {
            assert_eq!("stop_times", table);
            assert_eq!("drop_off_type", source.field());
        }
        e => panic!("unexpected error {:?}", e),
    }
}

#[test]
fn strict_reading_checks_references() {
    init_logger();
    let source = minimal().with_table(
        "trips.txt",
        "trip_id,route_id,service_id\nT1,R1,S1\nT2,R9,S1\nT3,R1,S9\n",
    );
    let lenient = FeedReader::default().read_from_source(source.clone()).unwrap();
    assert_eq!(3, lenient.trips.len());
    assert!(lenient.quarantine.is_empty());

    let strict = FeedReader::default().strict(true).read_from_source(source).unwrap();
    assert_eq!(1, strict.trips.len());
    let errors: Vec<_> = strict.quarantine.iter().map(|u| &u.error).collect();
    assert_eq!(
        vec![
            &PropertyError::DanglingForeignKey {
                field: "route_id".to_owned(),
                table: "routes",
                value: "R9".to_owned()
            },
            &PropertyError::DanglingForeignKey {
                field: "service_id".to_owned(),
                table: "calendar",
                value: "S9".to_owned()
            },
        ],
        errors
    );
}

#[test]
fn duplicate_ids_keep_the_first_row() {
    init_logger();
    let source = minimal().with_table(
        "stops.txt",
        "stop_id,stop_name\nS,first\nS,second\nU,other\n",
    );
    let feed = FeedReader::default().read_from_source(source.clone()).unwrap();
    assert_eq!(2, feed.stops.len());
    assert_eq!(Some("first"), feed.get_stop("S").unwrap().name());
    assert_eq!(1, feed.quarantine.len());
    assert_eq!(
        PropertyError::DuplicateKey {
            field: "stop_id".to_owned(),
            value: "S".to_owned()
        },
        feed.quarantine[0].error
    );
    assert_eq!(Some("second"), feed.quarantine[0].properties.get("stop_name"));

    let err = FeedReader::default()
        .quarantine(false)
        .read_from_source(source)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidRow {
            source: PropertyError::DuplicateKey { .. },
            ..
        }
    ));
}

#[test]
fn rows_without_keys_are_quarantined() {
    init_logger();
    let source = minimal().with_table(
        "stop_times.txt",
        "trip_id,stop_id,stop_sequence\nT1,S,1\nT1,S,first\nT1,S,\n",
    );
    let feed = FeedReader::default().read_from_source(source).unwrap();
    assert_eq!(1, feed.stop_times.len());
    assert_eq!(2, feed.quarantine.len());
    assert!(matches!(
        feed.quarantine[0].error,
        PropertyError::InvalidType { .. }
    ));
    assert_eq!(
        PropertyError::missing("stop_sequence"),
        feed.quarantine[1].error
    );
}

#[test]
fn missing_required_tables() {
    init_logger();
    let mut source = minimal();
    assert!(source.remove("trips.txt").is_some());
    assert!(matches!(
        FeedReader::default().read_from_source(source),
        Err(Error::MissingFile(f)) if f == "trips.txt"
    ));

    // an empty table is present
    let empty_stop_times = minimal().with_table("stop_times.txt", "");
    assert!(FeedReader::default()
        .read_from_source(empty_stop_times)
        .is_ok());

    // stop_times are only required when they are read
    let mut no_stop_times = minimal();
    no_stop_times.remove("stop_times.txt");
    assert!(matches!(
        FeedReader::default().read_from_source(no_stop_times.clone()),
        Err(Error::MissingFile(f)) if f == "stop_times.txt"
    ));
    let feed = FeedReader::default()
        .read_stop_times(false)
        .read_from_source(no_stop_times)
        .unwrap();
    assert!(feed.stop_times.is_empty());

    let mut no_calendar = minimal();
    no_calendar.remove("calendar_dates.txt");
    assert!(matches!(
        FeedReader::default().read_from_source(no_calendar),
        Err(Error::MissingFile(_))
    ));

    assert!(matches!(
        Feed::new("fixtures/does-not-exist"),
        Err(Error::NotFileNorDirectory(_))
    ));
}

#[test]
fn agency_without_id() {
    init_logger();
    let source = minimal()
        .with_table(
            "agency.txt",
            "agency_name,agency_url,agency_timezone\nAgency,http://a.example,Europe/Paris\n",
        )
        .with_table("routes.txt", "route_id,route_short_name,route_type\nR1,1,3\n");
    let feed = FeedReader::default().strict(true).read_from_source(source).unwrap();
    assert!(feed.default_agency_id.is_none());
    assert!(feed.get_agency("").is_ok());
    assert_eq!(None, feed.get_route("R1").unwrap().agency_id());
    assert!(feed.quarantine.is_empty());
}

#[test]
fn every_agency_rejected() {
    init_logger();
    let source = minimal().with_table(
        "agency.txt",
        "agency_id,agency_url,agency_timezone\nA,http://a.example,Nowhere/City\n",
    );
    assert!(matches!(
        FeedReader::default().strict(true).read_from_source(source),
        Err(Error::MissingDefaultAgency)
    ));
}

#[test]
fn untrimmed_fields() {
    init_logger();
    let feed = FeedReader::default()
        .trim_fields(false)
        .read("fixtures/basic")
        .unwrap();
    assert_eq!(Some(" Other stop "), feed.get_stop("stop5").unwrap().name());
}

#[test]
fn rows_with_invalid_utf8_are_quarantined() {
    init_logger();
    let translations: &[u8] = b"table_name,field_name,language,translation,record_id\n\
stops,stop_name,br,Gare\xff,stop1\n\
stops,stop_name,br,Arsav,stop2\n";
    let archive = zipped_fixture_with(&[("translations.txt", translations)]);

    let feed = FeedReader::default()
        .read_from_reader(Cursor::new(archive.clone()))
        .unwrap();
    assert_eq!(1, feed.translations.len());
    assert_eq!(Some("Arsav"), feed.translations[0].translation());
    let unparsed = feed
        .quarantine
        .iter()
        .find(|u| u.table == "translations")
        .unwrap();
    assert_eq!(Some("stop1"), unparsed.properties.get("record_id"));
    match &unparsed.error {
        PropertyError::InvalidType { field, value, .. } => {
            assert_eq!("translation", field);
            assert_eq!("Gare\u{fffd}", value);
        }
        other => panic!("unexpected {:?}", other),
    }

    let err = FeedReader::default()
        .quarantine(false)
        .read_from_reader(Cursor::new(archive))
        .unwrap_err();
    match err {
        Error::InvalidRow { table, source } => {
            assert_eq!("translations", table);
            assert_eq!("translation", source.field());
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn entities_serialize_as_their_row() {
    let feed = basic();
    let json = serde_json::to_value(feed.get_route("1").unwrap()).unwrap();
    assert_eq!("1", json["route_id"]);
    assert_eq!("000000", json["route_color"]);
    assert!(json.get("route_desc").is_none());
}

#[test]
fn feed_can_be_shared_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Feed>();

    let feed = std::sync::Arc::new(basic());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let feed = feed.clone();
            std::thread::spawn(move || feed.stops.len())
        })
        .collect();
    for h in handles {
        assert_eq!(5, h.join().unwrap());
    }
}
