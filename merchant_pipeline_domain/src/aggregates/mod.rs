// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Aggregates: consistency boundaries built by folding stage outputs.

pub mod pipeline_record;

pub use pipeline_record::{
    CounterpartyInfo, CounterpartyType, Direction, DisambiguationMethod, ExtractionMethod, FlowType,
    PipelineRecord, ResolutionMethod, Stage1Info, Stage2Info, Stage3Info, Stage4Info, Stage5Info,
    StageAnnotations,
};
