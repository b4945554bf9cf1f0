//! Migration plan output

use crate::migration::MigrationPlan;

/// Print the plan for review before any module is touched
pub fn print_plan(plan: &MigrationPlan) {
    println!();
    println!("{}", plan.to_table());
    println!("\nTotal: {} module(s) to delete and recreate", plan.len());
}
