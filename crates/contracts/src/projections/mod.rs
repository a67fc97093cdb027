pub mod p901_related_data;
pub mod p902_invoice_detail;
