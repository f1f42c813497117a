use chrono::Utc;
use log::{debug, info, warn};

use crate::calendar::CalendarIndex;
use crate::error::{LineError, PropertyError};
use crate::index::{IdIndex, Table, TwoKeyIndex};
use crate::objects::*;
use crate::properties::Properties;
use crate::source::{self, RowSource, ZipSource};
use crate::validation::{Lenient, Strict, Validate, ValidationPolicy};
use crate::{Error, Feed};

/// Tables that must be in every feed
const REQUIRED_TABLES: [&str; 4] = ["agency", "routes", "stops", "trips"];

/// Allows to parameterize how the feed is read
///
/// ```
///let feed = transit_feed::FeedReader::default()
///    .read_stop_times(false) // Won’t read the stop times to save time and memory
///    .strict(true) // Every row is checked, including its references
///    .read("fixtures/basic")?;
///assert_eq!(0, feed.stop_times.len());
/// # Ok::<(), transit_feed::Error>(())
///```
#[derive(Derivative, Debug, Clone)]
#[derivative(Default)]
pub struct FeedReader {
    /// Check every row against the rules of its table, instead of only its keys
    #[derivative(Default(value = "false"))]
    pub strict: bool,
    /// Keep the rows that fail in [Feed::quarantine] and go on.
    /// When false, the first failing row stops the reading
    #[derivative(Default(value = "true"))]
    pub quarantine: bool,
    /// [crate::objects::StopTime] are very large and not always needed. This allows to skip reading them
    #[derivative(Default(value = "true"))]
    pub read_stop_times: bool,
    /// Avoid trimming the fields
    ///
    /// It is quite time consumming
    /// If performance is an issue, and if your data is high quality, you can switch it off
    #[derivative(Default(value = "true"))]
    pub trim_fields: bool,
}

impl FeedReader {
    /// Selects the rules the rows are checked against (default: false, only the keys are required)
    ///
    /// Returns Self and can be chained
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Keep the failing rows aside instead of failing (default: true)
    ///
    /// Returns Self and can be chained
    pub fn quarantine(mut self, quarantine: bool) -> Self {
        self.quarantine = quarantine;
        self
    }

    /// Configures the reader to read or not the stop times (default: true)
    ///
    /// This can be useful to save time and memory with large datasets when the timetable are not needed
    /// Returns Self and can be chained
    pub fn read_stop_times(mut self, read_stop_times: bool) -> Self {
        self.read_stop_times = read_stop_times;
        self
    }

    /// Should the fields be trimmed (default: true)
    ///
    /// It is quite time consumming
    /// If performance is an issue, and if your data is high quality, you can set it to false
    pub fn trim_fields(mut self, trim_fields: bool) -> Self {
        self.trim_fields = trim_fields;
        self
    }

    /// Reads from a local path, either a directory or a zip archive
    ///
    /// See also [FeedReader::read_from_path] if the path is not a string
    pub fn read(self, feed: &str) -> Result<Feed, Error> {
        self.read_from_path(feed)
    }

    /// Reads the feed from a local zip archive or local directory
    pub fn read_from_path<P>(self, path: P) -> Result<Feed, Error>
    where
        P: AsRef<std::path::Path>,
    {
        let source = source::from_path(path)?;
        self.load(source)
    }

    /// Reads a zip archive from any object implementing [std::io::Read] and [std::io::Seek]
    pub fn read_from_reader<R>(self, reader: R) -> Result<Feed, Error>
    where
        R: std::io::Read + std::io::Seek + Send + 'static,
    {
        let source = ZipSource::from_reader(reader)?;
        self.load(Box::new(source))
    }

    /// Reads the feed from any [RowSource]
    pub fn read_from_source<S: RowSource + 'static>(self, source: S) -> Result<Feed, Error> {
        self.load(Box::new(source))
    }

    fn load(&self, source: Box<dyn RowSource>) -> Result<Feed, Error> {
        if self.strict {
            self.load_with::<Strict>(source)
        } else {
            self.load_with::<Lenient>(source)
        }
    }

    fn check_required(&self, source: &dyn RowSource) -> Result<(), Error> {
        for table in REQUIRED_TABLES {
            if !source.contains(table) {
                return Err(Error::MissingFile(format!("{}.txt", table)));
            }
        }
        if self.read_stop_times && !source.contains("stop_times") {
            return Err(Error::MissingFile("stop_times.txt".to_owned()));
        }
        if !source.contains("calendar") && !source.contains("calendar_dates") {
            return Err(Error::MissingFile("calendar.txt".to_owned()));
        }
        Ok(())
    }

    /// Loads every table, each one after the tables it references
    fn load_with<V: ValidationPolicy>(&self, source: Box<dyn RowSource>) -> Result<Feed, Error> {
        let now = Utc::now();
        info!("reading feed from {} files", source.files().len());
        self.check_required(source.as_ref())?;

        let mut loader = Loader {
            reader: self,
            source: source.as_ref(),
            quarantine: Vec::new(),
        };
        let mut feed = Feed::default();

        let agencies: Agencies = loader.load::<Agency, V, _>(&feed, None)?;
        if agencies.index.is_empty() {
            return Err(Error::MissingDefaultAgency);
        }
        // an agency without id is keyed by the empty string, nothing to give
        feed.default_agency_id = agencies.first.filter(|id| !id.is_empty());
        feed.agencies = agencies.index;
        let agency = feed.default_agency_id.clone();

        feed.routes = loader.load::<Route, V, _>(&feed, agency.as_deref())?;
        let calendars: IdIndex<Calendar> = loader.load::<Calendar, V, _>(&feed, None)?;
        let calendar_dates: TwoKeyIndex<CalendarDate> =
            loader.load::<CalendarDate, V, _>(&feed, None)?;
        feed.calendar = CalendarIndex::new(calendars, calendar_dates);
        feed.stops = loader.load::<Stop, V, _>(&feed, None)?;
        feed.trips = loader.load::<Trip, V, _>(&feed, None)?;
        if self.read_stop_times {
            feed.stop_times = loader.load::<StopTime, V, _>(&feed, None)?;
        }
        feed.fare_attributes = loader.load::<FareAttribute, V, _>(&feed, agency.as_deref())?;
        feed.fare_rules = loader.load::<FareRule, V, _>(&feed, None)?;
        feed.shapes = loader.load::<ShapePoint, V, _>(&feed, None)?;
        feed.frequencies = loader.load::<Frequency, V, _>(&feed, None)?;
        feed.transfers = loader.load::<Transfer, V, _>(&feed, None)?;
        feed.pathways = loader.load::<Pathway, V, _>(&feed, None)?;
        feed.levels = loader.load::<Level, V, _>(&feed, None)?;
        feed.translations = loader.load::<Translation, V, _>(&feed, None)?;
        feed.attributions = loader.load::<Attribution, V, _>(&feed, None)?;
        feed.feed_info = loader.load::<FeedInfo, V, _>(&feed, None)?;
        feed.areas = loader.load::<Area, V, _>(&feed, None)?;
        feed.stop_areas = loader.load::<StopArea, V, _>(&feed, None)?;
        feed.networks = loader.load::<Network, V, _>(&feed, None)?;
        feed.route_networks = loader.load::<RouteNetwork, V, _>(&feed, None)?;
        feed.fare_media = loader.load::<FareMedia, V, _>(&feed, None)?;
        feed.fare_products = loader.load::<FareProduct, V, _>(&feed, None)?;
        feed.fare_leg_rules = loader.load::<FareLegRule, V, _>(&feed, None)?;
        feed.fare_transfer_rules = loader.load::<FareTransferRule, V, _>(&feed, None)?;
        feed.timeframes = loader.load::<Timeframe, V, _>(&feed, None)?;

        feed.quarantine = loader.quarantine;
        feed.set_source(source);
        feed.read_duration = Utc::now().signed_duration_since(now).num_milliseconds();
        info!(
            "feed read in {} ms, {} rows quarantined",
            feed.read_duration,
            feed.quarantine.len()
        );
        Ok(feed)
    }
}

/// Agencies, remembering the first one loaded
///
/// The routes and fares without `agency_id` belong to that agency.
#[derive(Default)]
struct Agencies {
    index: IdIndex<Agency>,
    first: Option<String>,
}

impl Table<Agency> for Agencies {
    fn check(&self, agency: &Agency) -> Result<(), PropertyError> {
        self.index.check(agency)
    }

    fn insert(&mut self, agency: Agency) -> Result<(), PropertyError> {
        if self.first.is_none() {
            self.first = Some(agency.id().to_owned());
        }
        self.index.insert(agency)
    }
}

/// State shared by the loads of the tables of one feed
struct Loader<'a> {
    reader: &'a FeedReader,
    source: &'a dyn RowSource,
    quarantine: Vec<UnparsedEntity>,
}

impl<'a> Loader<'a> {
    /// Reads every row of the table of `T` into a new collection
    ///
    /// `feed` holds the tables already loaded, for the foreign keys.
    /// When `agency` is given, rows without `agency_id` get it.
    fn load<T, V, C>(&mut self, feed: &Feed, agency: Option<&str>) -> Result<C, Error>
    where
        T: Validate,
        V: ValidationPolicy,
        C: Table<T>,
    {
        let rows = self
            .source
            .read_table(T::TABLE, self.reader.trim_fields)?;
        let mut table = C::default();
        let mut loaded = 0;
        let mut rejected = 0;

        for row in rows {
            let unparsed = match row {
                Ok(row) => {
                    let properties = Properties::with_default(row, "agency_id", agency);
                    match Parsed::<T>::build(properties, |p| T::validate::<V>(p, feed)) {
                        Parsed::Entity(entity) => match table.check(&entity) {
                            Ok(()) => {
                                table.insert(entity).map_err(|source| Error::InvalidRow {
                                    table: T::TABLE.to_owned(),
                                    source,
                                })?;
                                loaded += 1;
                                continue;
                            }
                            Err(error) => {
                                UnparsedEntity::new::<T>(entity.properties().clone(), error)
                            }
                        },
                        Parsed::Unparsed(unparsed) => unparsed,
                    }
                }
                Err(Error::InvalidUtf8 {
                    field,
                    line_in_error,
                    ..
                }) => undecodable::<T>(field, line_in_error),
                Err(e) => return Err(e),
            };

            if !self.reader.quarantine {
                return Err(Error::InvalidRow {
                    table: T::TABLE.to_owned(),
                    source: unparsed.error,
                });
            }
            warn!("{}: row quarantined, {}", T::TABLE, unparsed.error);
            rejected += 1;
            self.quarantine.push(unparsed);
        }

        debug!("{}: {} loaded, {} quarantined", T::TABLE, loaded, rejected);
        Ok(table)
    }
}

/// A row with a value that is not UTF-8, kept with the replacement characters
fn undecodable<T: Entity>(field: String, line: LineError) -> UnparsedEntity {
    let properties = Properties::new(line.headers.iter().zip(&line.values));
    let value = properties.get(&field).unwrap_or_default().to_owned();
    UnparsedEntity::new::<T>(
        properties,
        PropertyError::InvalidType {
            field,
            expected: "UTF-8 text",
            value,
        },
    )
}
