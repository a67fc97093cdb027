//! Sales statistics over the grouped period rows.
//!
//! Amounts arrive already signed (`amount × sign`); all sums below operate
//! on signed values, except the unsigned weights used for unit prices.

use std::collections::{BTreeMap, HashMap};

use contracts::dashboards::d400_sales_statistics::{
    ClientProduct, ClientRanking, DailySales, SalesStatistics, SalesSummary, TopArticle,
};
use contracts::shared::period::Period;

use super::repository::{InvoiceGroupRow, LineGroupRow};
use crate::shared::pricing::weighted_unit_price;

pub const TOP_ARTICLES: usize = 5;
pub const TOP_CLIENTS: usize = 15;

#[derive(Debug, Clone)]
pub struct SignedInvoice {
    pub client_id: Option<i64>,
    /// Trimmed, upper-cased
    pub client_name: String,
    pub invoices: u64,
    pub raw_total: f64,
    pub total: f64,
    pub net_taxed: f64,
    pub is_sale: bool,
    pub month: u32,
    pub day: u32,
}

impl From<&InvoiceGroupRow> for SignedInvoice {
    fn from(row: &InvoiceGroupRow) -> Self {
        Self {
            client_id: row.client_id,
            client_name: normalize_name(row.client_name.as_deref()),
            invoices: row.invoices,
            raw_total: row.raw_total,
            total: row.total,
            net_taxed: row.net_taxed,
            is_sale: row.sale > 0,
            month: row.month,
            day: row.day,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignedLine {
    pub client_id: Option<i64>,
    pub client_name: String,
    pub article_id: i64,
    pub description: String,
    pub code: String,
    /// Every line of the group has a positive quantity
    pub positive: bool,
    pub lines: u32,
    pub raw_quantity: f64,
    pub quantity: f64,
    pub total: f64,
    pub net_taxed: f64,
    pub net_with_discount: f64,
    pub price_x_qty: f64,
    pub net_price_x_qty: f64,
    pub discount_sum: f64,
}

impl From<&LineGroupRow> for SignedLine {
    fn from(row: &LineGroupRow) -> Self {
        Self {
            client_id: row.client_id,
            client_name: normalize_name(row.client_name.as_deref()),
            article_id: row.article_id,
            description: row.description.clone(),
            code: row.code.clone(),
            positive: row.positive > 0,
            lines: row.lines,
            raw_quantity: row.raw_quantity,
            quantity: row.quantity,
            total: row.total,
            net_taxed: row.net_taxed,
            net_with_discount: row.net_with_discount,
            price_x_qty: row.price_x_qty,
            net_price_x_qty: row.net_price_x_qty,
            discount_sum: row.discount_sum,
        }
    }
}

fn normalize_name(name: Option<&str>) -> String {
    name.unwrap_or("").trim().to_uppercase()
}

pub fn build_statistics(
    period: Period,
    invoices: &[InvoiceGroupRow],
    lines: &[LineGroupRow],
    search: Option<&str>,
) -> SalesStatistics {
    let invoices: Vec<SignedInvoice> = invoices.iter().map(SignedInvoice::from).collect();
    let lines: Vec<SignedLine> = lines.iter().map(SignedLine::from).collect();

    SalesStatistics {
        mes: period.month(),
        anio: period.year(),
        resumen_ventas: summarize(&invoices),
        articulos_mas_vendidos: top_articles(&lines),
        ventas_diarias: daily_sales(&invoices),
        clientes_ranking: client_ranking(&invoices, &lines, search),
        diagnostico: None,
    }
}

pub fn summarize(invoices: &[SignedInvoice]) -> SalesSummary {
    let sales = invoices.iter().filter(|i| i.is_sale);
    let total_ventas: u64 = sales.clone().map(|i| i.invoices).sum();
    let promedio_venta = if total_ventas == 0 {
        0.0
    } else {
        sales.map(|i| i.raw_total).sum::<f64>() / total_ventas as f64
    };

    SalesSummary {
        total_ventas,
        total_facturacion: invoices.iter().map(|i| i.total).sum(),
        total_facturacion_neto_gravado: invoices.iter().map(|i| i.net_taxed).sum(),
        promedio_venta,
    }
}

#[derive(Default)]
struct ArticleTotals {
    quantity: f64,
    total: f64,
    net_with_discount: f64,
}

/// Best sellers by signed quantity. Only lines with a positive raw
/// quantity are counted; articles whose signed quantity is not positive
/// are left out.
pub fn top_articles(lines: &[SignedLine]) -> Vec<TopArticle> {
    let mut groups: HashMap<(String, String), ArticleTotals> = HashMap::new();
    for line in lines.iter().filter(|l| l.positive) {
        let acc = groups
            .entry((line.description.clone(), line.code.clone()))
            .or_default();
        acc.quantity += line.quantity;
        acc.total += line.total;
        acc.net_with_discount += line.net_with_discount;
    }

    let mut articles: Vec<TopArticle> = groups
        .into_iter()
        .filter(|(_, acc)| acc.quantity > 0.0)
        .map(|((descripcion, codigo), acc)| TopArticle {
            descripcion,
            codigo,
            cantidad_vendida: acc.quantity,
            total_ventas: acc.total,
            total_neto_gravado_con_descuento: acc.net_with_discount,
            precio_unitario_ponderado: weighted_unit_price(acc.total, acc.quantity),
        })
        .collect();

    articles.sort_by(|a, b| {
        b.cantidad_vendida
            .total_cmp(&a.cantidad_vendida)
            .then_with(|| a.descripcion.cmp(&b.descripcion))
    });
    articles.truncate(TOP_ARTICLES);
    articles
}

/// Per calendar day of the period, in chronological order
pub fn daily_sales(invoices: &[SignedInvoice]) -> Vec<DailySales> {
    let mut days: BTreeMap<(u32, u32), (u64, f64)> = BTreeMap::new();
    for inv in invoices {
        let entry = days.entry((inv.month, inv.day)).or_insert((0, 0.0));
        if inv.is_sale {
            entry.0 += inv.invoices;
        }
        entry.1 += inv.total;
    }

    days.into_iter()
        .map(|((mes, dia), (cantidad_ventas, total_dia))| DailySales {
            dia,
            mes,
            cantidad_ventas,
            total_dia,
        })
        .collect()
}

struct ClientTotals {
    name: String,
    total: f64,
    invoices: u64,
}

fn matches_search(term: &str, client_id: i64, name: &str) -> bool {
    let term = term.trim();
    term.is_empty()
        || name.contains(&term.to_uppercase())
        || term.parse::<i64>().map(|id| id == client_id).unwrap_or(false)
}

/// Top clients by signed net-taxed billing. Clients without a name or
/// with a non-positive total never rank. `search` narrows the candidates
/// before the top-N cut.
pub fn client_ranking(
    invoices: &[SignedInvoice],
    lines: &[SignedLine],
    search: Option<&str>,
) -> Vec<ClientRanking> {
    let mut clients: HashMap<i64, ClientTotals> = HashMap::new();
    for inv in invoices.iter().filter(|i| !i.client_name.is_empty()) {
        let Some(client_id) = inv.client_id else {
            continue;
        };
        let acc = clients.entry(client_id).or_insert_with(|| ClientTotals {
            name: String::new(),
            total: 0.0,
            invoices: 0,
        });
        acc.total += inv.net_taxed;
        if inv.is_sale {
            acc.invoices += inv.invoices;
        }
        if inv.client_name > acc.name {
            acc.name = inv.client_name.clone();
        }
    }

    let mut ranking: Vec<(i64, ClientTotals)> = clients
        .into_iter()
        .filter(|(_, acc)| acc.total > 0.0)
        .filter(|(id, acc)| search.map_or(true, |term| matches_search(term, *id, &acc.name)))
        .collect();

    ranking.sort_by(|(id_a, a), (id_b, b)| b.total.total_cmp(&a.total).then_with(|| id_a.cmp(id_b)));
    ranking.truncate(TOP_CLIENTS);

    ranking
        .into_iter()
        .map(|(client_id, acc)| {
            let client_lines: Vec<&SignedLine> = lines
                .iter()
                .filter(|l| l.client_id == Some(client_id) && !l.client_name.is_empty())
                .collect();
            ClientRanking {
                nombre_cliente: acc.name,
                cliente_id: client_id,
                total_facturado: acc.total,
                cantidad_facturas: acc.invoices,
                productos: client_products(&client_lines),
            }
        })
        .collect()
}

#[derive(Default)]
struct ProductTotals {
    quantity: f64,
    weight: f64,
    price_x_qty: f64,
    net_price_x_qty: f64,
    discount_sum: f64,
    lines: u32,
    net_taxed: f64,
    net_with_discount: f64,
}

/// Products bought by one client, highest net-taxed first
pub fn client_products(lines: &[&SignedLine]) -> Vec<ClientProduct> {
    let mut groups: HashMap<(i64, String, String), ProductTotals> = HashMap::new();
    for line in lines {
        let acc = groups
            .entry((line.article_id, line.description.clone(), line.code.clone()))
            .or_default();
        acc.quantity += line.quantity;
        acc.weight += line.raw_quantity;
        acc.price_x_qty += line.price_x_qty;
        acc.net_price_x_qty += line.net_price_x_qty;
        acc.discount_sum += line.discount_sum;
        acc.lines += line.lines;
        acc.net_taxed += line.net_taxed;
        acc.net_with_discount += line.net_with_discount;
    }

    let mut products: Vec<ClientProduct> = groups
        .into_iter()
        .filter(|(_, acc)| acc.quantity > 0.0)
        .map(|((_, description, code), acc)| ClientProduct {
            producto_descripcion: description,
            producto_codigo: code,
            cantidad_total: acc.quantity,
            precio_unitario: weighted_unit_price(acc.price_x_qty, acc.weight),
            porcentaje_descuento: acc.discount_sum / acc.lines.max(1) as f64,
            precio_unitario_neto_con_descuento: weighted_unit_price(acc.net_price_x_qty, acc.weight),
            total_neto_gravado: acc.net_taxed,
            total_neto_con_descuento: acc.net_with_discount,
        })
        .collect();

    products.sort_by(|a, b| {
        b.total_neto_gravado
            .total_cmp(&a.total_neto_gravado)
            .then_with(|| a.producto_descripcion.cmp(&b.producto_descripcion))
    });
    products
}
