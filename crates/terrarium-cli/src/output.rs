//! Rendering of command results
//!
//! Every result is either printed for a terminal or wrapped in a
//! `{"status": "success", "data": ...}` envelope when `--json` is set.

use anyhow::Result;
use chrono::NaiveDateTime;
use console::style;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Display;
use terrarium_core::models::{AreaMeasure, AreaUnit, Centroid, ExportJob};
use terrarium_engine::JobStatus;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

pub struct OutputWriter {
    json: bool,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `data` as a JSON envelope, or hand over to `human` for terminal output
    fn emit<T: Serialize>(&self, data: T, human: impl FnOnce(&Self)) -> Result<()> {
        if self.json {
            let output = json!({ "status": "success", "data": data });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            human(self);
        }
        Ok(())
    }

    fn success(&self, message: impl Display) {
        println!("{} {}", style("✓").green().bold(), message);
    }

    /// Warnings go to stderr in both modes so stdout stays a single document
    fn warning(&self, message: impl Display) {
        if self.json {
            eprintln!("{}", json!({ "status": "warning", "message": message.to_string() }));
        } else {
            eprintln!("{} {}", style("⚠").yellow().bold(), message);
        }
    }

    fn kv(&self, key: impl Display, value: impl Display) {
        println!("{}: {}", style(key).bold(), value);
    }

    fn section(&self, title: impl Display) {
        println!("\n{}", style(title).bold().underlined());
    }

    fn pretty(&self, value: &Value) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => println!("{}", text),
            Err(_) => println!("{}", value),
        }
    }

    pub fn area(&self, measure: &AreaMeasure) -> Result<()> {
        self.emit(measure, |out| {
            out.section("Area");
            for unit in AreaUnit::ALL {
                out.kv(unit.label(), measure.get(unit));
            }
        })
    }

    pub fn centroid(&self, centroid: &Centroid) -> Result<()> {
        self.emit(centroid, |out| {
            out.section("Centroid");
            out.kv("Longitude", centroid.longitude);
            out.kv("Latitude", centroid.latitude);
        })
    }

    /// A reshaped region as a feature collection with its area
    pub fn region(&self, geojson: &Value, area: &AreaMeasure) -> Result<()> {
        self.emit(json!({ "region": geojson, "area": area }), |out| {
            out.success(format!("Reshaped region covers {:.3} km²", area.sqkm));
            out.pretty(geojson);
        })
    }

    pub fn location(&self, longitude: f64, latitude: f64, location: &str, known: bool) -> Result<()> {
        let data = json!({ "longitude": longitude, "latitude": latitude, "location": location });
        if !known {
            self.warning("No administrative area found at this coordinate");
        }
        self.emit(data, |out| out.kv("Location", location))
    }

    pub fn latest_date(&self, date: Option<NaiveDateTime>) -> Result<()> {
        if date.is_none() {
            self.warning("No acquisitions over the region in the past week");
        }
        self.emit(json!({ "date": date }), |out| {
            if let Some(date) = date {
                out.kv("Latest acquisition", date.format(DATE_FORMAT));
            }
        })
    }

    pub fn covering_image(&self, date: NaiveDateTime, image: Option<&str>) -> Result<()> {
        if image.is_none() {
            self.warning(format!("No image fully covers the region within a day of {}", date));
        }
        self.emit(json!({ "date": date, "image": image }), |out| {
            if let Some(image) = image {
                out.kv("Covering image", image);
            }
        })
    }

    /// Serialized expression graph of an image that was not exported
    pub fn expression(&self, graph: &Value) -> Result<()> {
        self.emit(graph, |out| out.pretty(graph))
    }

    pub fn export_job(&self, job: &ExportJob, destination: &str) -> Result<()> {
        self.emit(job, |out| {
            out.success(format!("Submitted export to {}", destination));
            out.kv("Operation", job.operation_name());
        })
    }

    pub fn job_status(&self, status: &JobStatus) -> Result<()> {
        self.emit(status, |out| {
            out.section("Task Status");
            if let Some(name) = status.name() {
                out.kv("Operation", name);
            }
            out.kv("State", format!("{:?}", status.state()));
            out.kv("Done", status.is_done());
            if let Some(message) = status.error_message() {
                out.kv("Error", message);
            }
        })
    }
}
