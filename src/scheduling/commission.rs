//! Commission aggregation over completed appointments

use chrono::NaiveDate;
use chrono_tz::Tz;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{
    catalog::Staff,
    report::{CommissionLine, CommissionReport, CompletedServiceRow},
};

const NO_DATA_MESSAGE: &str = "No completed services in the selected period";

fn money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn commission_of(price: Decimal, rate: Decimal) -> Decimal {
    price * rate / Decimal::ONE_HUNDRED
}

/// Build the commission report for `staff` from the completed appointments
/// already filtered to `[start_date, end_date]`.
///
/// Line dates are local to the establishment zone.
pub fn build_commission_report(
    staff: &Staff,
    start_date: NaiveDate,
    end_date: NaiveDate,
    tz: Tz,
    rows: &[CompletedServiceRow],
) -> CommissionReport {
    let rate = staff.commission_rate;

    let items: Vec<CommissionLine> = rows
        .iter()
        .map(|row| CommissionLine {
            appointment_id: row.appointment_id,
            date: row.start_at.with_timezone(&tz).date_naive(),
            client_name: row.client_name.clone(),
            service_name: row.service_name.clone(),
            price: money(row.price),
            commission: money(commission_of(row.price, rate)),
        })
        .collect();

    let total_service_value: Decimal = rows.iter().map(|r| r.price).sum();
    let commission_value = money(commission_of(total_service_value, rate));
    let fixed_salary = money(staff.salary_amount);

    let message = (rows.is_empty() && rate > Decimal::ZERO).then(|| NO_DATA_MESSAGE.to_string());

    CommissionReport {
        staff_id: staff.id,
        staff_name: staff.name.clone(),
        start_date,
        end_date,
        fixed_salary,
        commission_rate: rate,
        total_services: rows.len() as i64,
        total_service_value: money(total_service_value),
        commission_value,
        total_payable: fixed_salary + commission_value,
        items,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use chrono_tz::America::Sao_Paulo;
    use rust_decimal_macros::dec;

    fn staff(rate: Decimal, salary: Decimal) -> Staff {
        Staff {
            id: 7,
            establishment_id: 1,
            name: "Ana".into(),
            email: None,
            commission_rate: rate,
            salary_amount: salary,
            is_active: true,
        }
    }

    fn row(id: i32, price: Decimal) -> CompletedServiceRow {
        CompletedServiceRow {
            appointment_id: id,
            start_at: Utc.with_ymd_and_hms(2025, 9, id as u32, 14, 0, 0).unwrap(),
            client_name: "Client".into(),
            service_name: "Cut".into(),
            price,
        }
    }

    fn range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
        )
    }

    #[test]
    fn test_twenty_percent_of_three_services() {
        let (start, end) = range();
        let rows = vec![row(1, dec!(100.00)), row(2, dec!(50.00)), row(3, dec!(30.00))];
        let report = build_commission_report(&staff(dec!(20), dec!(1000.00)), start, end, Sao_Paulo, &rows);

        assert_eq!(report.total_services, 3);
        assert_eq!(report.total_service_value, dec!(180.00));
        assert_eq!(report.commission_value, dec!(36.00));
        assert_eq!(report.total_payable, dec!(1036.00));
        assert_eq!(report.items[1].commission, dec!(10.00));
        assert!(report.message.is_none());
    }

    #[test]
    fn test_no_work_with_commission_has_message() {
        let (start, end) = range();
        let report = build_commission_report(&staff(dec!(15), dec!(1200)), start, end, Sao_Paulo, &[]);
        assert_eq!(report.total_services, 0);
        assert_eq!(report.commission_value, Decimal::ZERO);
        assert_eq!(report.total_payable, dec!(1200));
        assert!(report.message.is_some());
    }

    #[test]
    fn test_fixed_salary_only_has_no_message() {
        let (start, end) = range();
        let report = build_commission_report(&staff(Decimal::ZERO, dec!(1500)), start, end, Sao_Paulo, &[]);
        assert!(report.message.is_none());
        assert_eq!(report.total_payable, dec!(1500));
    }

    #[test]
    fn test_rounds_to_cents() {
        let (start, end) = range();
        let rows = vec![row(1, dec!(33.33))];
        let report = build_commission_report(&staff(dec!(12.5), Decimal::ZERO), start, end, Sao_Paulo, &rows);
        // 33.33 * 12.5% = 4.166250
        assert_eq!(report.commission_value, dec!(4.17));
    }

    #[test]
    fn test_line_date_is_local() {
        let (start, end) = range();
        // 01:30 UTC on the 2nd is still the 1st in São Paulo
        let mut r = row(2, dec!(10));
        r.start_at = Utc.with_ymd_and_hms(2025, 9, 2, 1, 30, 0).unwrap();
        let report = build_commission_report(&staff(dec!(10), Decimal::ZERO), start, end, Sao_Paulo, &[r]);
        assert_eq!(report.items[0].date, NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());
    }
}
