//! # Modules
//!
//! Functional areas of the Workforce application. A module key identifies
//! the part of the product a grant applies to (e.g. `payroll`, `employees`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Product area a module belongs to.
///
/// Areas drive navigation grouping; they play no part in permission lookup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Area {
    /// People and attendance.
    Workforce,
    /// Money in and out.
    Finance,
    /// Project delivery.
    Delivery,
    /// Hiring and development.
    Talent,
    /// Tenant administration.
    Administration,
}

impl Area {
    /// Get the string representation of the area.
    pub fn as_str(&self) -> &'static str {
        match self {
            Area::Workforce => "workforce",
            Area::Finance => "finance",
            Area::Delivery => "delivery",
            Area::Talent => "talent",
            Area::Administration => "administration",
        }
    }

    /// Parse area from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "workforce" | "people" => Some(Area::Workforce),
            "finance" => Some(Area::Finance),
            "delivery" => Some(Area::Delivery),
            "talent" => Some(Area::Talent),
            "administration" | "admin" => Some(Area::Administration),
            _ => None,
        }
    }
}

/// Module keys that can appear in the role-permission matrix.
///
/// Modules are organized by area:
/// - **Workforce**: Employees, TimeTracking, Absence, Shifts
/// - **Finance**: Payroll, Billing, Budgets, Expenses
/// - **Delivery**: Projects, Tasks
/// - **Talent**: Goals, Recruiting, Performance
/// - **Administration**: Settings, Roles, Reports, AuditLog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    // Workforce
    /// Employee directory and profiles.
    Employees,
    /// Clock-in/out and timesheets.
    TimeTracking,
    /// Vacation, sick leave and other absences.
    Absence,
    /// Shift planning.
    Shifts,

    // Finance
    /// Payroll runs and payslips.
    Payroll,
    /// Subscription and invoices.
    Billing,
    /// Project and department budgets.
    Budgets,
    /// Expense claims.
    Expenses,

    // Delivery
    /// Projects.
    Projects,
    /// Project tasks.
    Tasks,

    // Talent
    /// Objectives and key results.
    Goals,
    /// Vacancies, candidates and interviews.
    Recruiting,
    /// Performance reviews.
    Performance,

    // Administration
    /// Tenant settings.
    Settings,
    /// Role and permission administration.
    Roles,
    /// Cross-module reports.
    Reports,
    /// Audit trail.
    AuditLog,
}

impl Module {
    /// Get the module key as stored in the matrix.
    pub fn as_str(&self) -> &'static str {
        match self {
            // Workforce
            Module::Employees => "employees",
            Module::TimeTracking => "time_tracking",
            Module::Absence => "absence",
            Module::Shifts => "shifts",
            // Finance
            Module::Payroll => "payroll",
            Module::Billing => "billing",
            Module::Budgets => "budgets",
            Module::Expenses => "expenses",
            // Delivery
            Module::Projects => "projects",
            Module::Tasks => "tasks",
            // Talent
            Module::Goals => "goals",
            Module::Recruiting => "recruiting",
            Module::Performance => "performance",
            // Administration
            Module::Settings => "settings",
            Module::Roles => "roles",
            Module::Reports => "reports",
            Module::AuditLog => "audit_log",
        }
    }

    /// Get the area this module belongs to.
    ///
    /// # Example
    ///
    /// ```
    /// use workforce_rbac::modules::{Area, Module};
    ///
    /// assert_eq!(Module::Payroll.area(), Area::Finance);
    /// assert_eq!(Module::Absence.area(), Area::Workforce);
    /// assert_eq!(Module::Settings.area(), Area::Administration);
    /// ```
    pub fn area(&self) -> Area {
        match self {
            Module::Employees | Module::TimeTracking | Module::Absence | Module::Shifts => {
                Area::Workforce
            }
            Module::Payroll | Module::Billing | Module::Budgets | Module::Expenses => Area::Finance,
            Module::Projects | Module::Tasks => Area::Delivery,
            Module::Goals | Module::Recruiting | Module::Performance => Area::Talent,
            Module::Settings | Module::Roles | Module::Reports | Module::AuditLog => {
                Area::Administration
            }
        }
    }

    /// Parse a module key.
    ///
    /// Matching is case-insensitive; hyphens and spaces are treated as
    /// underscores, and a few singular/legacy spellings are accepted.
    ///
    /// # Example
    ///
    /// ```
    /// use workforce_rbac::modules::Module;
    ///
    /// assert_eq!(Module::parse("time_tracking"), Some(Module::TimeTracking));
    /// assert_eq!(Module::parse("Time-Tracking"), Some(Module::TimeTracking));
    /// assert_eq!(Module::parse("employee"), Some(Module::Employees));
    /// assert_eq!(Module::parse("spaceships"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        match key.as_str() {
            // Workforce
            "employees" | "employee" | "people" => Some(Module::Employees),
            "time_tracking" | "timetracking" | "time" | "timesheets" => Some(Module::TimeTracking),
            "absence" | "absences" | "leave" => Some(Module::Absence),
            "shifts" | "shift" | "shift_planning" => Some(Module::Shifts),
            // Finance
            "payroll" => Some(Module::Payroll),
            "billing" => Some(Module::Billing),
            "budgets" | "budget" => Some(Module::Budgets),
            "expenses" | "expense" => Some(Module::Expenses),
            // Delivery
            "projects" | "project" => Some(Module::Projects),
            "tasks" | "task" => Some(Module::Tasks),
            // Talent
            "goals" | "goal" | "okrs" => Some(Module::Goals),
            "recruiting" | "recruitment" => Some(Module::Recruiting),
            "performance" | "reviews" => Some(Module::Performance),
            // Administration
            "settings" | "setting" => Some(Module::Settings),
            "roles" | "role" | "permissions" => Some(Module::Roles),
            "reports" | "report" | "reporting" => Some(Module::Reports),
            "audit_log" | "auditlog" | "audit" => Some(Module::AuditLog),
            _ => None,
        }
    }

    /// Get all modules.
    pub fn all() -> Vec<Self> {
        vec![
            // Workforce
            Module::Employees,
            Module::TimeTracking,
            Module::Absence,
            Module::Shifts,
            // Finance
            Module::Payroll,
            Module::Billing,
            Module::Budgets,
            Module::Expenses,
            // Delivery
            Module::Projects,
            Module::Tasks,
            // Talent
            Module::Goals,
            Module::Recruiting,
            Module::Performance,
            // Administration
            Module::Settings,
            Module::Roles,
            Module::Reports,
            Module::AuditLog,
        ]
    }

    /// Get all modules in an area.
    pub fn in_area(area: Area) -> Vec<Self> {
        Self::all().into_iter().filter(|m| m.area() == area).collect()
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
