//! Basic usage example for wireschema
//!
//! Run with: cargo run --example basic_usage

use wireschema::schema::render::{emit, RenderContext};
use wireschema::schema::source::load_str;
use wireschema::*;

const SCHEMA: &str = include_str!("trading.yaml");

fn main() -> Result<()> {
    println!("wireschema Basic Usage Example");
    println!("==============================");

    // Example 1: Load and validate a declaration document
    println!("\n1. Schema:");
    let root = load_str(SCHEMA)?;
    let model = SchemaValidator::new(TypeCatalog::standard()).validate(&root)?;
    let order = model.byte_order();
    println!(
        "  {} types, {} messages, {} constant groups, {} byte order",
        model.types().len(),
        model.messages().len(),
        model.const_groups().len(),
        order
    );
    for message in model.messages() {
        let chain: Vec<&str> = model.lineage(&message.name).map(|m| m.name.as_str()).collect();
        println!(
            "  {:<8} id={} fields={} size={:?} lineage={}",
            message.name,
            message.id,
            message.fields.len(),
            message.fixed_wire_size(),
            chain.join(" -> ")
        );
    }

    // Example 2: Encode a Trade body, then prepend its header
    println!("\n2. Trade Message:");
    // Header is 12 bytes, more than the default front reserve
    let mut buf = DataBuffer::with_config(BufferConfig {
        prepend_size: 16,
        byte_order: order,
        ..BufferConfig::default()
    });
    {
        let mut enc = Encoder::with_order(&mut buf, order);
        enc.put_bytes(b"AAPL\0\0\0\0");
        enc.put_i64(50_000_000);
        enc.put_u32(100);
        enc.put_str("opening cross")?;
    }
    batch_write_front(
        &mut buf,
        order,
        &[WriteField::U32(12345), WriteField::U64(1_700_000_000_000_000_000)],
    )?;
    println!("  Encoded {} bytes, {} prependable left", buf.size(), buf.prependable_bytes());

    let trade = model.message("Trade").map(|m| m.fields.as_slice()).unwrap_or_default();
    let header = model.message("Header").map(|m| m.fields.as_slice()).unwrap_or_default();
    let codecs = header.iter().chain(trade).filter_map(|f| f.codec());
    println!("  Complete frame on the wire: {} bytes", batch_read_size(&buf, order, codecs));

    // Example 3: Decode all or nothing
    println!("\n3. Decode:");
    let mut seq = 0u32;
    let mut ts_ns = 0u64;
    let mut symbol = [0u8; 8];
    let mut price = 0i64;
    let mut qty = 0u32;
    let mut note = String::new();
    read_fields!(
        &mut buf, order;
        &mut seq, &mut ts_ns, &mut symbol, &mut price, &mut qty, &mut note
    )?;
    println!(
        "  seq={seq} ts={ts_ns} symbol={} price={price} qty={qty} note={note:?}",
        String::from_utf8_lossy(&symbol).trim_end_matches('\0')
    );

    // Example 4: A short buffer leaves the cursor untouched
    println!("\n4. Partial Frame:");
    let mut partial = DataBuffer::new();
    partial.write_int(7u32, order);
    partial.write(&[0xFF, 0xFF]);
    let before = partial.size();
    let result = read_fields!(&mut partial, order; &mut seq, &mut ts_ns);
    println!("  {:?}, readable bytes {} -> {}", result, before, partial.size());

    // Example 5: Hand the model to a template engine
    println!("\n5. Templates:");
    let context = RenderContext::new(&model, "demo");
    println!("  {} keys in the types document", context.types().as_object().map_or(0, |o| o.len()));
    let outline = |template: &str, doc: &serde_json::Value| -> core::result::Result<String, String> {
        let name = doc
            .get("MSG_NAME")
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        Ok(format!("// {template} for {name}\n"))
    };
    for file in emit(&model, "demo", &outline)? {
        print!("  {:<14} {}", file.path, file.contents);
    }

    Ok(())
}
