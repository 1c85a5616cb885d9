use crate::record::WorkoutRecord;
use crate::types::RoutePoint;
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use std::fs;
use std::io::Write;
use std::path::Path;

pub fn parse_gpx_points(path: &Path) -> Result<Vec<RoutePoint>> {
    let bytes = fs::read(path).with_context(|| format!("reading GPX: {}", path.display()))?;
    parse_gpx_bytes(&bytes)
}

pub fn parse_gpx_str(s: &str) -> Result<Vec<RoutePoint>> {
    parse_gpx_bytes(s.as_bytes())
}

fn parse_gpx_bytes(bytes: &[u8]) -> Result<Vec<RoutePoint>> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }

    let mut xml = Reader::from_reader(bytes);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();

    let mut st = GpxState::default();
    let mut out: Vec<RoutePoint> = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => handle_gpx_start(&mut st, &e),
            Ok(Event::End(e)) => handle_gpx_end(&mut st, &e, &mut out),
            Ok(Event::Text(e)) => {
                handle_gpx_text(&mut st, &e);
            }
            Err(e) => anyhow::bail!("GPX XML parse error: {e}"),
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

#[derive(Default)]
struct GpxState {
    in_trkpt: bool,
    in_time: bool,
    in_ele: bool,

    cur_lat: Option<f64>,
    cur_lon: Option<f64>,
    cur_time: Option<DateTime<Utc>>,
    cur_ele: Option<f64>,
}

fn handle_gpx_start(st: &mut GpxState, e: &BytesStart<'_>) {
    match e.name().as_ref() {
        b"trkpt" => {
            st.in_trkpt = true;
            st.in_time = false;
            st.in_ele = false;

            st.cur_time = None;
            st.cur_ele = None;

            let (lat, lon) = parse_trkpt_lat_lon(e);
            st.cur_lat = lat;
            st.cur_lon = lon;
        }
        b"time" if st.in_trkpt => {
            st.in_time = true;
        }
        b"ele" if st.in_trkpt => {
            st.in_ele = true;
        }
        _ => {}
    }
}

fn handle_gpx_end(st: &mut GpxState, e: &BytesEnd<'_>, out: &mut Vec<RoutePoint>) {
    match e.name().as_ref() {
        b"time" => st.in_time = false,
        b"ele" => st.in_ele = false,
        b"trkpt" => {
            st.in_trkpt = false;

            let (Some(lat), Some(lon), Some(t)) = (st.cur_lat, st.cur_lon, st.cur_time) else {
                crate::dlog!("gpx_skip_incomplete_trkpt idx={}", out.len());
                return;
            };

            let point = RoutePoint {
                t,
                lat,
                lon,
                ele: st.cur_ele.filter(|e| e.is_finite()),
            };
            if !point.has_valid_coordinates() {
                crate::dlog!("gpx_skip_bad_coordinates lat={lat} lon={lon}");
                return;
            }
            out.push(point);
        }
        _ => {}
    }
}

fn handle_gpx_text(st: &mut GpxState, e: &BytesText<'_>) {
    if st.in_time
        && let Ok(s) = e.decode()
        && let Ok(dt_fixed) = DateTime::parse_from_rfc3339(s.as_ref())
    {
        st.cur_time = Some(dt_fixed.with_timezone(&Utc));
    } else if st.in_ele
        && let Ok(s) = e.decode()
        && let Ok(v) = s.parse::<f64>()
    {
        st.cur_ele = Some(v);
    }
}

fn parse_trkpt_lat_lon(e: &BytesStart<'_>) -> (Option<f64>, Option<f64>) {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for a in e.attributes().with_checks(false).flatten() {
        let key = a.key.as_ref();
        if key == b"lat"
            && let Ok(v) = a.unescape_value()
        {
            lat = v.parse::<f64>().ok();
        } else if key == b"lon"
            && let Ok(v) = a.unescape_value()
        {
            lon = v.parse::<f64>().ok();
        }
    }

    (lat, lon)
}

/// Writes the route of `record` as a GPX 1.1 document with a single track segment.
pub fn write_gpx<W: Write>(record: &WorkoutRecord, out: W) -> Result<()> {
    let mut w = Writer::new_with_indent(out, b' ', 2);

    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    w.write_event(Event::Start(BytesStart::new("gpx").with_attributes([
        ("version", "1.1"),
        ("creator", "stridelog"),
        ("xmlns", "http://www.topografix.com/GPX/1/1"),
    ])))?;

    w.write_event(Event::Start(BytesStart::new("trk")))?;
    let name = record
        .title()
        .map_or_else(|| record.workout_type().to_string(), str::to_string);
    write_text_element(&mut w, "name", &name)?;
    write_text_element(&mut w, "type", record.workout_type().slug())?;

    w.write_event(Event::Start(BytesStart::new("trkseg")))?;
    for p in record.route() {
        let lat = p.lat.to_string();
        let lon = p.lon.to_string();
        w.write_event(Event::Start(
            BytesStart::new("trkpt").with_attributes([("lat", lat.as_str()), ("lon", lon.as_str())]),
        ))?;
        if let Some(ele) = p.ele {
            write_text_element(&mut w, "ele", &ele.to_string())?;
        }
        write_text_element(
            &mut w,
            "time",
            &p.t.to_rfc3339_opts(SecondsFormat::Millis, true),
        )?;
        w.write_event(Event::End(BytesEnd::new("trkpt")))?;
    }
    w.write_event(Event::End(BytesEnd::new("trkseg")))?;
    w.write_event(Event::End(BytesEnd::new("trk")))?;
    w.write_event(Event::End(BytesEnd::new("gpx")))?;

    w.into_inner().flush().context("flushing GPX output")?;
    Ok(())
}

fn write_text_element<W: Write>(w: &mut Writer<W>, tag: &str, text: &str) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new(tag)))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}
