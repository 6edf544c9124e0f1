//! Static schema registry for every observation record type.
//!
//! Each entry is the single source of truth for its record type: the route
//! it is served under, the target relation and column order, which payload
//! fields are required, which need numeric coercion, and which dashboard
//! section it belongs to. Adding a record type means adding one entry here,
//! not new handler code.

/// How a payload value is coerced and cast on its way into the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Numeric,
    Integer,
    Date,
    Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Waste,
    Feeding,
    Drying,
    Facility,
    Hatchery,
}

impl Section {
    pub fn parse(s: &str) -> Option<Section> {
        match s {
            "waste" => Some(Section::Waste),
            "feeding" => Some(Section::Feeding),
            "drying" => Some(Section::Drying),
            "facility" => Some(Section::Facility),
            "hatchery" => Some(Section::Hatchery),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct FieldSpec {
    /// Payload field name after key normalization (snake_case).
    pub field: &'static str,
    /// Target column. Usually identical to `field`, but a handful of
    /// record types use shorter payload names than their columns.
    pub column: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Default bound for absent optional fields; `None` means SQL NULL.
    pub default: Option<&'static str>,
}

const fn req(field: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { field, column: field, kind, required: true, default: None }
}

const fn req_as(field: &'static str, column: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { field, column, kind, required: true, default: None }
}

const fn opt(field: &'static str, kind: FieldKind, default: Option<&'static str>) -> FieldSpec {
    FieldSpec { field, column: field, kind, required: false, default }
}

const fn opt_as(field: &'static str, column: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { field, column, kind, required: false, default: None }
}

#[derive(Debug)]
pub struct RecordSchema {
    /// Path under `/api/`, e.g. `waste-sourcing` or `drying/batch`.
    pub route: &'static str,
    /// Legacy alternate paths still accepted for creation.
    pub aliases: &'static [&'static str],
    pub table: &'static str,
    /// Display label used by the date/section report.
    pub label: &'static str,
    pub section: Section,
    /// Column used for day filtering and list ordering.
    pub date_column: &'static str,
    /// Whether the authenticated principal's username is appended as
    /// `recorded_by` rather than taken from the payload.
    pub stamp_recorded_by: bool,
    pub fields: &'static [FieldSpec],
}

use FieldKind::{Date, Integer, Numeric, Text, Time};

pub static SCHEMAS: &[RecordSchema] = &[
    // --- Waste management ---
    RecordSchema {
        route: "waste-sourcing",
        aliases: &[],
        table: "waste_sourcing",
        label: "Waste Sourcing",
        section: Section::Waste,
        date_column: "collection_date",
        stamp_recorded_by: false,
        fields: &[
            req("collection_date", Date),
            req("collection_time", Time),
            req("source_type", Text),
            req("source_name", Text),
            req("waste_type", Text),
            req("waste_weight", Numeric),
            req("segregation_status", Text),
            opt("contaminants_found", Text, Some("")),
            opt("collection_notes", Text, Some("")),
            req("collection_personnel", Text),
            req("recorded_by", Text),
        ],
    },
    RecordSchema {
        route: "storage-records",
        aliases: &[],
        table: "storage_records",
        label: "Storage Records",
        section: Section::Waste,
        date_column: "storage_date",
        stamp_recorded_by: true,
        fields: &[
            req("storage_date", Date),
            req("storage_method", Text),
            req("storage_conditions", Text),
            req("storage_duration", Integer),
            req("planned_utilization", Text),
            opt("storage_observations", Text, Some("")),
        ],
    },
    RecordSchema {
        route: "processing-records",
        aliases: &[],
        table: "processing_records",
        label: "Processing Records",
        section: Section::Waste,
        date_column: "processing_date",
        stamp_recorded_by: true,
        fields: &[
            req("processing_date", Date),
            req("processing_type", Text),
            req("processing_method", Text),
            req("waste_processed", Numeric),
            opt("by_products", Numeric, None),
            opt("waste_reduction", Numeric, None),
            opt("processing_remarks", Text, Some("")),
        ],
    },
    RecordSchema {
        route: "environmental-monitoring",
        aliases: &["environmental-monitoring-waste"],
        table: "environmental_monitoring_waste",
        label: "Waste Environmental Monitoring",
        section: Section::Waste,
        date_column: "monitoring_date",
        stamp_recorded_by: true,
        fields: &[
            req("monitoring_date", Date),
            req("monitoring_time", Time),
            req("temperature", Numeric),
            req("humidity", Numeric),
            req("odor_level", Text),
            req("pest_presence", Text),
            opt("pest_details", Text, Some("")),
            opt("mitigation_actions", Text, Some("")),
            opt("remarks", Text, Some("")),
        ],
    },
    RecordSchema {
        route: "substrate-preparation",
        aliases: &[],
        table: "substrate_preparation",
        label: "Substrate Preparation",
        section: Section::Waste,
        date_column: "prep_date",
        stamp_recorded_by: false,
        fields: &[
            req("batch_no", Text),
            req("prep_date", Date),
            req("organic_waste_source", Text),
            req("moisture_percentage", Numeric),
            req("waste_particle_size", Text),
            req("foreign_matter", Text),
            req("handler_operator", Text),
            opt("notes", Text, Some("")),
        ],
    },
    // --- Larval feeding ---
    RecordSchema {
        route: "feeding/environmental-monitoring",
        aliases: &[],
        table: "feeding_environmental_monitoring",
        label: "Environmental Monitoring",
        section: Section::Feeding,
        date_column: "monitoring_date",
        stamp_recorded_by: true,
        fields: &[
            req("monitoring_date", Date),
            req("monitoring_time", Time),
            req("tray_facility_id", Text),
            req("temperature", Numeric),
            req("humidity", Numeric),
            req("ammonia_odor", Text),
            opt("notes", Text, None),
        ],
    },
    RecordSchema {
        route: "feeding/health-intervention",
        aliases: &[],
        table: "feeding_health_intervention",
        label: "Health & Intervention",
        section: Section::Feeding,
        date_column: "health_check_date",
        stamp_recorded_by: true,
        fields: &[
            req_as("health_date", "health_check_date", Date),
            req("tray_batch_id", Text),
            req("observed_issue", Text),
            req("severity", Text),
            req("action_taken", Text),
            opt("follow_up_date", Date, None),
            opt("resolved", Text, None),
            opt("comments", Text, None),
        ],
    },
    RecordSchema {
        route: "feeding/harvest-yield",
        aliases: &["feeding/harvest"],
        table: "feeding_harvest_yield",
        label: "Harvest & Yield",
        section: Section::Feeding,
        date_column: "harvest_date",
        stamp_recorded_by: true,
        fields: &[
            req("harvest_date", Date),
            req("tray_batch_id", Text),
            req("instar_stage", Text),
            req("larvae_collected_kg", Numeric),
            req("processing_method", Text),
            opt("storage_temperature_celsius", Numeric, None),
            opt("notes", Text, None),
        ],
    },
    RecordSchema {
        route: "feeding/schedule",
        aliases: &[],
        table: "feeding_schedule",
        label: "Feeding Schedule",
        section: Section::Feeding,
        date_column: "feeding_date",
        stamp_recorded_by: true,
        fields: &[
            req("feeding_date", Date),
            req("tray_batch_id", Text),
            req("larvae_age_days", Integer),
            req("larvae_weight_g", Numeric),
            req("feed_type", Text),
            req("feed_quantity_kg", Numeric),
            opt("start_weight_g", Numeric, None),
            opt("end_weight_kg", Numeric, None),
            opt("consumption_g", Numeric, None),
            req("operator", Text),
        ],
    },
    // --- Drying ---
    RecordSchema {
        route: "drying/batch",
        aliases: &[],
        table: "drying_batches",
        label: "Batch Information",
        section: Section::Drying,
        date_column: "drying_date",
        stamp_recorded_by: false,
        fields: &[
            req("batch_id", Text),
            req("drying_date", Date),
            req("drying_method", Text),
            req("personnel", Text),
            req("status", Text),
        ],
    },
    RecordSchema {
        route: "drying/input",
        aliases: &[],
        table: "drying_input",
        label: "Input Records",
        section: Section::Drying,
        date_column: "created_at",
        stamp_recorded_by: true,
        fields: &[
            req("batch_id", Text),
            req_as("wet_harvested", "wet_harvested_kg", Numeric),
            req_as("wet_placed", "wet_placed_for_drying_kg", Numeric),
            req_as("dried_by_personnel", "dried_by_personnel_kg", Numeric),
            req_as("sand_used", "sand_used_kg", Numeric),
            opt_as("sand_reused", "sand_reused_kg", Numeric),
            opt("notes", Text, None),
        ],
    },
    // Creation goes through the dedicated drying-output handler, which
    // appends the derived ratio/yield columns; the entry still drives
    // validation, listing and the date report.
    RecordSchema {
        route: "drying/output",
        aliases: &[],
        table: "drying_output",
        label: "Output Records",
        section: Section::Drying,
        date_column: "created_at",
        stamp_recorded_by: true,
        fields: &[
            req("batch_id", Text),
            req_as("dried_produced", "dried_produced_kg", Numeric),
            opt_as("solar_drying_taken", "solar_drying_taken_kg", Numeric),
            opt_as("silo_bag_stored", "stored_in_silo_bag_kg", Numeric),
            opt_as("dried_sold", "sold_kg", Numeric),
            opt("notes", Text, None),
        ],
    },
    RecordSchema {
        route: "drying/qc",
        aliases: &["drying/quality-control"],
        table: "drying_quality_control",
        label: "Quality Control",
        section: Section::Drying,
        date_column: "qc_date",
        stamp_recorded_by: true,
        fields: &[
            req("batch_id", Text),
            req("qc_date", Date),
            req("sand_removal", Text),
            opt("contaminants_found", Text, Some("")),
            req("color_quality", Text),
            req("moisture_level", Text),
            req("qc_personnel", Text),
            opt("notes", Text, None),
        ],
    },
    RecordSchema {
        route: "drying/review",
        aliases: &[],
        table: "drying_review_approval",
        label: "Review & Approval",
        section: Section::Drying,
        date_column: "review_date",
        stamp_recorded_by: true,
        fields: &[
            req("batch_id", Text),
            req("reviewed_by", Text),
            req("review_date", Date),
            req("approval_status", Text),
            opt("comments", Text, None),
        ],
    },
    // --- Fly facility ---
    RecordSchema {
        route: "facility/cage-monitoring",
        aliases: &[],
        table: "fly_facility_cage_monitoring",
        label: "Cage Monitoring",
        section: Section::Facility,
        date_column: "monitoring_date",
        stamp_recorded_by: true,
        fields: &[
            req_as("date", "monitoring_date", Date),
            req("cage_id", Text),
            req("temperature", Numeric),
            req("humidity", Numeric),
            req("lighting_hours", Numeric),
            req("ventilation_ok", Text),
            req("cage_cleaned", Text),
            req("dead_flies_removed", Text),
            req("cage_damage", Text),
            opt("damage_notes", Text, None),
            opt("additional_notes", Text, None),
        ],
    },
    RecordSchema {
        route: "facility/maintenance",
        aliases: &[],
        table: "fly_facility_maintenance",
        label: "Facility Maintenance",
        section: Section::Facility,
        date_column: "maintenance_date",
        stamp_recorded_by: true,
        fields: &[
            req_as("date", "maintenance_date", Date),
            req("moat_check", Text),
            req("ants_present", Text),
            req("rodents_present", Text),
            req("bird_net_ok", Text),
            req("trench_refilled", Text),
            req("maintenance_notes", Text),
        ],
    },
    RecordSchema {
        route: "facility/pupae-transition",
        aliases: &[],
        table: "fly_facility_pupae_transition",
        label: "Pupae Transition",
        section: Section::Facility,
        date_column: "transition_date",
        stamp_recorded_by: true,
        fields: &[
            req_as("date", "transition_date", Date),
            req("love_cage_id", Text),
            req("pupae_weight_added_kg", Numeric),
            req("old_pupae_removed_kg", Numeric),
            req("dead_flies_removed", Text),
            req("water_points_checked", Text),
            req("new_egg_crates_installed", Text),
            opt("number_of_crates", Integer, None),
            opt("notes", Text, None),
        ],
    },
    RecordSchema {
        route: "facility/egg-collection",
        aliases: &[],
        table: "fly_facility_egg_collection",
        label: "Egg Collection",
        section: Section::Facility,
        date_column: "collection_date",
        stamp_recorded_by: true,
        fields: &[
            req_as("date", "collection_date", Date),
            req_as("time", "collection_time", Text),
            req("cage_id", Text),
            req_as("eggs_collected", "eggs_collected_g", Numeric),
            req("bait_replaced", Text),
            req("eggs_intact", Text),
            req("collector_name", Text),
            req("collection_method", Text),
            opt("notes", Text, None),
        ],
    },
    RecordSchema {
        route: "facility/bait-preparation",
        aliases: &[],
        table: "fly_facility_bait_preparation",
        label: "Bait Preparation",
        section: Section::Facility,
        date_column: "start_date",
        stamp_recorded_by: true,
        fields: &[
            req("barrel_id", Text),
            req("bait_type", Text),
            req("ingredients_added", Text),
            req("start_date", Date),
            req("ready_date", Date),
            opt("used_in_cage_ids", Text, None),
            opt("notes", Text, None),
        ],
    },
    // --- Hatchery ---
    RecordSchema {
        route: "hatchery/batch",
        aliases: &["hatchery/batch-information"],
        table: "hatchery_batches",
        label: "Hatchery Batch Information",
        section: Section::Hatchery,
        date_column: "batch_date",
        stamp_recorded_by: false,
        fields: &[
            req("batch_number", Text),
            req("batch_date", Date),
            req("egg_incubation_date", Date),
            req("total_eggs_grams", Numeric),
            req("expected_hatch_date", Date),
            opt("actual_hatch_date", Date, None),
            opt("hatch_days", Integer, None),
            req("supervisor_name", Text),
            opt("notes", Text, None),
        ],
    },
    RecordSchema {
        route: "hatchery/feeding",
        aliases: &["hatchery/feeding-records"],
        table: "hatchery_feeding",
        label: "Feeding Records",
        section: Section::Hatchery,
        date_column: "feeding_date",
        stamp_recorded_by: false,
        fields: &[
            req("batch_id", Text),
            req("feeding_date", Date),
            req("feed_per_5g_eggs_grams", Numeric),
            req("total_feed_used_grams", Numeric),
            req("days_to_utilize", Integer),
            req("feed_type", Text),
            req("feed_source", Text),
            req("distribution_method", Text),
            opt("notes", Text, None),
        ],
    },
    RecordSchema {
        route: "hatchery/monitoring",
        aliases: &["hatchery/environmental-monitoring"],
        table: "hatchery_monitoring",
        label: "Hatchery Environmental Monitoring",
        section: Section::Hatchery,
        date_column: "monitoring_date",
        stamp_recorded_by: false,
        fields: &[
            req("monitoring_date", Date),
            req("temperature_c", Numeric),
            req("humidity_percent", Numeric),
            opt("adjustments_made", Text, None),
        ],
    },
    RecordSchema {
        route: "hatchery/cleaning",
        aliases: &[],
        table: "hatchery_cleaning",
        label: "Cleaning & Sanitation",
        section: Section::Hatchery,
        date_column: "cleaning_date",
        stamp_recorded_by: false,
        fields: &[
            req("cleaning_date", Date),
            req("areas_cleaned", Text),
            req("cleaning_materials", Text),
            req("cleaning_personnel", Text),
            opt("remarks", Text, None),
        ],
    },
    RecordSchema {
        route: "hatchery/problems",
        aliases: &[],
        table: "hatchery_problems",
        label: "Problems & Solutions",
        section: Section::Hatchery,
        date_column: "problem_date",
        stamp_recorded_by: false,
        fields: &[
            req("problem_date", Date),
            req("problem_identified", Text),
            req("proposed_solution", Text),
            req("responsible_person", Text),
            opt("days_to_implement", Integer, None),
            opt("resolution_status", Text, None),
            opt("additional_comments", Text, None),
        ],
    },
    RecordSchema {
        route: "hatchery/health",
        aliases: &[],
        table: "hatchery_health_interventions",
        label: "Health Interventions",
        section: Section::Hatchery,
        date_column: "health_date",
        stamp_recorded_by: false,
        fields: &[
            req("health_date", Date),
            req("health_issue", Text),
            req("severity", Text),
            req("action_taken", Text),
            opt("follow_up_date", Date, None),
            opt("resolved", Text, None),
            opt("comments", Text, None),
        ],
    },
];

pub fn find(route: &str) -> Option<&'static RecordSchema> {
    SCHEMAS
        .iter()
        .find(|s| s.route == route || s.aliases.contains(&route))
}

pub fn in_section(section: Section) -> impl Iterator<Item = &'static RecordSchema> {
    SCHEMAS.iter().filter(move |s| s.section == section)
}
