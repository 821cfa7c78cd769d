//! Dashboard tabs
//!
//! The result view has five fixed tabs. Each one shows a disjoint slice of
//! the report; `TabView` borrows that slice so the UI can fetch one tab at a
//! time.

use crate::models::{
    BusinessAlignment, ChartPoint, DataInfrastructure, EthicsGovernance, Kpi, RoadmapPhase,
    StrategyReport, TalentCapabilities, UseCase,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum DashboardTab {
    #[default]
    Overview,
    Alignment,
    Data,
    Talent,
    Ethics,
}

impl DashboardTab {
    /// Display order
    pub const ALL: [DashboardTab; 5] = [
        DashboardTab::Overview,
        DashboardTab::Alignment,
        DashboardTab::Data,
        DashboardTab::Talent,
        DashboardTab::Ethics,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            DashboardTab::Overview => "overview",
            DashboardTab::Alignment => "alignment",
            DashboardTab::Data => "data",
            DashboardTab::Talent => "talent",
            DashboardTab::Ethics => "ethics",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DashboardTab::Overview => "Resumen Ejecutivo",
            DashboardTab::Alignment => "Negocio & Roadmap",
            DashboardTab::Data => "Datos & Infra",
            DashboardTab::Talent => "Talento",
            DashboardTab::Ethics => "Ética & Riesgos",
        }
    }
}

impl fmt::Display for DashboardTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for DashboardTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DashboardTab::ALL
            .into_iter()
            .find(|tab| tab.id() == s)
            .ok_or_else(|| format!("unknown tab: {}", s))
    }
}

/// Tab descriptor for navigation
#[derive(Debug, Clone, Serialize)]
pub struct TabInfo {
    pub id: &'static str,
    pub label: &'static str,
}

pub fn tab_index() -> Vec<TabInfo> {
    DashboardTab::ALL
        .iter()
        .map(|tab| TabInfo {
            id: tab.id(),
            label: tab.label(),
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewTab<'a> {
    pub company_name: &'a str,
    pub executive_summary: &'a str,
    pub kpis: &'a [Kpi],
    pub projected_growth: &'a [ChartPoint],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentTab<'a> {
    pub challenges: &'a [String],
    pub goals: &'a [String],
    pub high_impact_use_cases: &'a [UseCase],
    pub roadmap: &'a [RoadmapPhase],
}

/// Slice of a report shown by one tab
#[derive(Debug, Serialize)]
#[serde(tag = "tab", content = "content", rename_all = "lowercase")]
pub enum TabView<'a> {
    Overview(OverviewTab<'a>),
    Alignment(AlignmentTab<'a>),
    Data(&'a DataInfrastructure),
    Talent(&'a TalentCapabilities),
    Ethics(&'a EthicsGovernance),
}

impl<'a> TabView<'a> {
    pub fn of(report: &'a StrategyReport, tab: DashboardTab) -> Self {
        match tab {
            DashboardTab::Overview => TabView::Overview(OverviewTab {
                company_name: &report.company_name,
                executive_summary: &report.executive_summary,
                kpis: &report.business_alignment.kpis,
                projected_growth: &report.projected_growth,
            }),
            DashboardTab::Alignment => {
                let BusinessAlignment {
                    challenges,
                    goals,
                    high_impact_use_cases,
                    roadmap,
                    ..
                } = &report.business_alignment;
                TabView::Alignment(AlignmentTab {
                    challenges,
                    goals,
                    high_impact_use_cases,
                    roadmap,
                })
            }
            DashboardTab::Data => TabView::Data(&report.data_infrastructure),
            DashboardTab::Talent => TabView::Talent(&report.talent_capabilities),
            DashboardTab::Ethics => TabView::Ethics(&report.ethics_governance),
        }
    }
}
