pub mod p900_entity_totals;
pub mod p901_related_data;
pub mod p902_invoice_detail;
