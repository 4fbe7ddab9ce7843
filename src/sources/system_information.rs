// Modemstat - Residential gateway status scraping
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! System information page

use crate::error::{ExtractError, Result};
use crate::extract::{get_datetime, get_duration, get_string, single_row};
use crate::gatherer::{ModemGatherer, StatusPage};
use crate::record::{duration_seconds, DomainRecord};
use crate::table::StatsTree;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::time::Duration;

/// Section holding the device identity and clock
pub const SECTION: &str = "This table includes system information about the device and its software";

/// Identity, firmware and clock of the device
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemInformation {
    pub manufacturer: String,
    pub model_number: String,
    pub serial_number: String,
    pub software_version: String,
    pub mac_address: String,
    pub first_use_date: NaiveDateTime,
    #[serde(with = "duration_seconds")]
    pub time_since_last_reboot: Duration,
    pub current_date_time: NaiveDateTime,
    pub datapump_version: String,
    pub hardware_version: String,
}

impl SystemInformation {
    /// Map the page; every field is required
    pub fn from_stats(tree: &StatsTree) -> std::result::Result<Self, ExtractError> {
        let data = single_row(tree, SECTION)?;
        Ok(Self {
            manufacturer: get_string(&data, "Manufacturer")?,
            model_number: get_string(&data, "Model Number")?,
            serial_number: get_string(&data, "Serial Number")?,
            software_version: get_string(&data, "Software Version")?,
            mac_address: get_string(&data, "MAC Address")?,
            first_use_date: get_datetime(&data, "First Use Date")?,
            time_since_last_reboot: get_duration(&data, "Time Since Last Reboot")?,
            current_date_time: get_datetime(&data, "Current Date/Time")?,
            datapump_version: get_string(&data, "Datapump Version")?,
            hardware_version: get_string(&data, "Hardware Version")?,
        })
    }
}

impl DomainRecord for SystemInformation {}

/// Page descriptor for [`SystemInformation`]
pub struct SystemInformationPage;

impl StatusPage for SystemInformationPage {
    type Record = SystemInformation;
    const NAME: &'static str = "SystemInformationGatherer";
    const PATH: &'static str = "/cgi-bin/sysinfo.ha";

    fn map(tree: &StatsTree) -> Result<SystemInformation> {
        Ok(SystemInformation::from_stats(tree)?)
    }
}

pub type SystemInformationGatherer = ModemGatherer<SystemInformationPage>;
