use chrono::NaiveDate;
use log::info;

use crate::calendar::CalendarIndex;
use crate::index::{IdIndex, OrderedIndex, TwoKeyIndex};
use crate::objects::*;
use crate::source::{MemorySource, RowSource};
use crate::time::ServiceTime;
use crate::{Error, FeedReader};

/// Data structure with all the tables of a feed, indexed
///
/// A feed is built once by a [FeedReader] and never modified afterwards, so
/// it can be shared between threads.
///
/// This is probably the entry point you want to use:
/// ```
/// let feed = transit_feed::Feed::from_path("fixtures/basic")?;
/// assert_eq!(feed.stops.len(), 5);
/// # Ok::<(), transit_feed::Error>(())
/// ```
///
/// Rows that could not be loaded are kept in [Feed::quarantine].
#[derive(Derivative)]
#[derivative(Default, Debug)]
pub struct Feed {
    /// Time needed to read and index the feed in milliseconds
    pub read_duration: i64,
    /// All agencies by `agency_id`, the empty string when the feed does not give one
    pub agencies: IdIndex<Agency>,
    /// `agency_id` of the first agency, given to routes and fares without one
    pub default_agency_id: Option<String>,
    /// All routes by `route_id`
    pub routes: IdIndex<Route>,
    /// Every service, from `calendar` and `calendar_dates`
    pub calendar: CalendarIndex,
    /// All stops by `stop_id`
    pub stops: IdIndex<Stop>,
    /// All trips by `trip_id`
    pub trips: IdIndex<Trip>,
    /// Stop times by `trip_id`, ordered by `stop_sequence`
    pub stop_times: OrderedIndex<StopTime>,
    /// All fare attributes by `fare_id`
    pub fare_attributes: IdIndex<FareAttribute>,
    pub fare_rules: Vec<FareRule>,
    /// Shape points by `shape_id`, ordered by `shape_pt_sequence`
    pub shapes: OrderedIndex<ShapePoint>,
    /// Frequencies by `trip_id` and `start_time`
    pub frequencies: TwoKeyIndex<Frequency>,
    pub transfers: Vec<Transfer>,
    pub pathways: IdIndex<Pathway>,
    pub levels: IdIndex<Level>,
    pub translations: Vec<Translation>,
    pub attributions: Vec<Attribution>,
    /// All feed information. There is no identifier
    pub feed_info: Vec<FeedInfo>,
    pub areas: IdIndex<Area>,
    /// Stops of each area, by `area_id` and `stop_id`
    pub stop_areas: TwoKeyIndex<StopArea>,
    pub networks: IdIndex<Network>,
    /// Routes of each network, by `network_id` and `route_id`
    pub route_networks: TwoKeyIndex<RouteNetwork>,
    pub fare_media: IdIndex<FareMedia>,
    /// Fare products by `fare_product_id` and `fare_media_id`, empty when not given
    pub fare_products: TwoKeyIndex<FareProduct>,
    pub fare_leg_rules: Vec<FareLegRule>,
    pub fare_transfer_rules: Vec<FareTransferRule>,
    pub timeframes: Vec<Timeframe>,
    /// Rows that could not be turned into entities, in reading order
    pub quarantine: Vec<UnparsedEntity>,
    /// All the files of the source
    pub files: Vec<String>,
    /// SHA-256 of the archive, `None` when read from a directory
    pub sha256: Option<String>,
    #[derivative(
        Debug = "ignore",
        Default(value = "Box::new(MemorySource::default())")
    )]
    source: Box<dyn RowSource>,
}

impl Feed {
    /// Reads a feed from a local path, either a directory or a zip archive
    ///
    /// See [FeedReader] to configure how the feed is read
    pub fn new(feed: &str) -> Result<Feed, Error> {
        FeedReader::default().read(feed)
    }

    /// Reads a feed from a local zip archive or local directory
    pub fn from_path<P>(path: P) -> Result<Feed, Error>
    where
        P: AsRef<std::path::Path>,
    {
        FeedReader::default().read_from_path(path)
    }

    /// Reads a zip archive from memory or any other seekable stream
    pub fn from_reader<R>(reader: R) -> Result<Feed, Error>
    where
        R: std::io::Read + std::io::Seek + Send + 'static,
    {
        FeedReader::default().read_from_reader(reader)
    }

    pub(crate) fn set_source(&mut self, source: Box<dyn RowSource>) {
        self.files = source.files();
        self.sha256 = source.sha256();
        self.source = source;
    }

    /// The source the feed was read from, to read the tables that are not modeled
    pub fn source(&self) -> &dyn RowSource {
        self.source.as_ref()
    }

    /// Logs some basic statistics about the feed (numbers of elements for each table). Mostly to be sure that everything was read
    pub fn log_stats(&self) {
        info!("Feed data:");
        info!("  Read in {} ms", self.read_duration);
        info!("  Agencies: {}", self.agencies.len());
        info!("  Routes: {}", self.routes.len());
        info!("  Services: {}", self.calendar.len());
        info!("  Stops: {}", self.stops.len());
        info!("  Trips: {}", self.trips.len());
        info!("  Stop times: {}", self.stop_times.len());
        info!("  Shape points: {}", self.shapes.len());
        info!("  Fare attributes: {}", self.fare_attributes.len());
        info!("  Fare products: {}", self.fare_products.len());
        info!("  Feed info: {}", self.feed_info.len());
        info!("  Quarantined rows: {}", self.quarantine.len());
    }

    /// Gets a [Stop] by its `stop_id`
    pub fn get_stop<'a>(&'a self, id: &str) -> Result<&'a Stop, Error> {
        self.stops
            .get(id)
            .ok_or_else(|| Error::ReferenceError(id.to_owned()))
    }

    /// Gets a [Trip] by its `trip_id`
    pub fn get_trip<'a>(&'a self, id: &str) -> Result<&'a Trip, Error> {
        self.trips
            .get(id)
            .ok_or_else(|| Error::ReferenceError(id.to_owned()))
    }

    /// Gets a [Route] by its `route_id`
    pub fn get_route<'a>(&'a self, id: &str) -> Result<&'a Route, Error> {
        self.routes
            .get(id)
            .ok_or_else(|| Error::ReferenceError(id.to_owned()))
    }

    /// Gets an [Agency] by its `agency_id`
    pub fn get_agency<'a>(&'a self, id: &str) -> Result<&'a Agency, Error> {
        self.agencies
            .get(id)
            .ok_or_else(|| Error::ReferenceError(id.to_owned()))
    }

    /// Gets the weekly [Calendar] of a service, if any, and all its [CalendarDate]
    pub fn get_calendar<'a>(
        &'a self,
        id: &str,
    ) -> Result<(Option<&'a Calendar>, Vec<&'a CalendarDate>), Error> {
        self.calendar
            .get(id)
            .ok_or_else(|| Error::ReferenceError(id.to_owned()))
    }

    /// Gets a [FareAttribute] by its `fare_id`
    pub fn get_fare_attribute<'a>(&'a self, id: &str) -> Result<&'a FareAttribute, Error> {
        self.fare_attributes
            .get(id)
            .ok_or_else(|| Error::ReferenceError(id.to_owned()))
    }

    /// The stop times of a trip, by increasing `stop_sequence`
    pub fn stop_times_for_trip<'a>(&'a self, trip_id: &str) -> Vec<&'a StopTime> {
        self.stop_times.sequence(trip_id).collect()
    }

    /// The points of a shape, by increasing `shape_pt_sequence`
    pub fn shape<'a>(&'a self, shape_id: &str) -> Vec<&'a ShapePoint> {
        self.shapes.sequence(shape_id).collect()
    }

    /// First departure and last arrival of a trip
    ///
    /// Times are counted from the start of the service day, so the last
    /// arrival of a trip running past midnight is above 24:00:00.
    /// Stop times without times are skipped. `None` if no stop time has a time.
    pub fn trip_span(&self, trip_id: &str) -> Option<(ServiceTime, ServiceTime)> {
        let stop_times = self.stop_times_for_trip(trip_id);
        let departure = stop_times
            .iter()
            .find_map(|st| st.departure_time().or_else(|| st.arrival_time()))?;
        let arrival = stop_times
            .iter()
            .rev()
            .find_map(|st| st.arrival_time().or_else(|| st.departure_time()))?;
        Some((departure, arrival))
    }

    /// For a given a `service_id` and a starting date returns all the following day offset the vehicle runs
    ///
    /// For instance if the `start_date` is 2021-12-20, `[0, 4]` means that the vehicle will run the 20th and 24th
    pub fn trip_days(&self, service_id: &str, start_date: NaiveDate) -> Vec<u16> {
        self.calendar.trip_days(service_id, start_date)
    }
}
