use memkit::prelude::*;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Context allocator, the heap unless overridden.
    let mut values = Array::<i32>::with_len(3);
    values[0] = 10;
    values[1] = 20;
    values[2] = 30;
    values.push(40);
    println!("values = {values:?}, last = {}", values[END - 1]);

    // Scratch memory from a slab arena, released in one go.
    let mut arena = SlabArenaOptions::new()
        .slab_size(64 * 1024)
        .build()
        .unwrap();
    for round in 0..3 {
        let mut squares = Array::new_in(arena.allocator());
        squares.extend((0..50_000u64).map(|i| i * i));
        println!(
            "round {round}: {} squares over {} slabs ({} bytes)",
            squares.len(),
            arena.slab_count(),
            arena.mem_usage()
        );
        drop(squares);
        arena.reset();
    }

    // Graceful failure on a small fixed buffer.
    let mut buf = [0u8; 256];
    let fixed = Arena::new(&mut buf);
    let mut bytes = Array::<u8>::new_in(fixed.allocator());
    match bytes.try_reserve(1024) {
        Ok(()) => println!("reserved 1 KiB"),
        Err(e) => println!("fixed arena: {e}"),
    }

    let mut slots = [0u8; 4];
    let mut ring = Ring::new(&mut slots);
    while ring.push(b'x').is_ok() {}
    println!("ring holds {} of {} slots", ring.len(), ring.capacity() + 1);
}
