//! Basic booking workflow example

use bigdecimal::BigDecimal;
use booking_core::utils::{MemoryScheduler, MemoryStore};
use booking_core::{
    BookingConfig, BookingSystem, Expense, ExpenseCategory, NewOrder, OrderStatus, OrderTemplate,
};
use chrono::NaiveDate;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("📷 Booking Core - Basic Booking Example\n");

    // Create a booking system over in-memory storage
    let store = MemoryStore::new();
    let scheduler = MemoryScheduler::new();
    let mut system = BookingSystem::load(store, scheduler, BookingConfig::default()).await?;

    // 1. Book a wedding from a template preset
    println!("📅 Booking Orders...\n");

    let templates = OrderTemplate::defaults();
    let wedding_template = templates
        .iter()
        .find(|t| t.name == "Full-day wedding")
        .expect("built-in template");

    let session_date = NaiveDate::from_ymd_opt(2026, 6, 20)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();

    let mut fields = NewOrder::from_template(wedding_template, session_date);
    fields.client_name = "Petr Svoboda".to_string();
    fields.client_email = "petr.svoboda@example.com".to_string();
    fields.location = "Prague".to_string();

    let wedding = system.add_order(fields).await?;
    println!(
        "  ✓ Booked: {} for {} ({} Kč, deposit {} Kč)",
        wedding.name, wedding.client_name, wedding.price, wedding.deposit
    );

    // The client was created automatically from the order
    let client = system
        .find_client_by_name("Petr Svoboda")
        .expect("client created from order");
    println!(
        "  ✓ Client on file: {} with {} order(s)",
        client.name, client.total_orders
    );
    println!();

    // 2. Collect the deposit, then the final payment
    println!("💰 Recording Payments...\n");

    system.set_deposit_paid(wedding.id, true).await?;
    let client = system.find_client_by_name("Petr Svoboda").unwrap();
    println!("  ✓ Deposit collected, client spend: {} Kč", client.total_spent);

    system.set_final_payment_paid(wedding.id, true).await?;
    let client = system.find_client_by_name("Petr Svoboda").unwrap();
    println!("  ✓ Fully paid, client spend: {} Kč", client.total_spent);

    let unpaid = system.unpaid_balance(client.id)?;
    println!("  ✓ Outstanding balance: {} Kč", unpaid);
    println!();

    // 3. Deliver the order and record an expense
    println!("📦 Wrapping Up...\n");

    system
        .update_order_status(wedding.id, OrderStatus::Delivered)
        .await?;
    println!("  ✓ Order marked as delivered");

    system
        .add_expense(Expense::new(
            "Lens rental".to_string(),
            BigDecimal::from(1200),
            ExpenseCategory::Equipment,
            NaiveDate::from_ymd_opt(2026, 6, 19).unwrap(),
        ))
        .await?;
    println!("  ✓ Expense recorded: lens rental 1200 Kč");
    println!();

    // 4. Look at the year's numbers
    println!("📈 Statistics for 2026...\n");

    println!("  Actual revenue:  {} Kč", system.actual_revenue(Some(2026)));
    println!("  Total expenses:  {} Kč", system.total_expenses(Some(2026)));
    println!("  Net profit:      {} Kč", system.net_profit(Some(2026)));
    println!("  Orders:          {}", system.order_count(Some(2026)));
    println!("  Years on file:   {:?}", system.available_years());

    let series = system.monthly_revenue(Some(2026));
    println!("  June revenue:    {} Kč", series[5].revenue);

    for (category, total) in system.expenses_by_category(Some(2026)) {
        println!("  {category} expenses: {total} Kč");
    }

    Ok(())
}
