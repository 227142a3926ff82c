use criterion::{black_box, criterion_group, criterion_main, Criterion};
use recycle_pool::*;

const BUFFER_SIZE: usize = 64 * 1024;

struct Buffer {
    data: Vec<u8>,
}

impl Default for Buffer {
    #[inline(always)]
    fn default() -> Self {
        Buffer {
            data: Vec::with_capacity(BUFFER_SIZE),
        }
    }
}

impl Poolable for Buffer {
    #[inline(always)]
    fn on_allocate(&mut self) {}

    #[inline(always)]
    fn on_deallocate(&mut self) {
        self.data.clear();
    }

    fn destroy(&mut self) {}
}

fn acquire_recycle(c: &mut Criterion) {
    c.bench_function("pool", |b| {
        let pool = Pool::<Buffer>::new(1024).unwrap();
        b.iter(|| {
            let obj = black_box(pool.acquire().unwrap());
            black_box(obj.borrow().data.capacity());
            pool.recycle(&obj).unwrap();
        })
    });
    c.bench_function("pool_template", |b| {
        #[derive(Clone, Default)]
        struct Node {
            transform: Transform,
        }
        impl Poolable for Node {
            const TEMPLATE_BOUND: bool = true;
            fn on_allocate(&mut self) {}
            fn on_deallocate(&mut self) {}
            fn destroy(&mut self) {}
        }
        impl Placement for Node {
            fn set_parent(&mut self, _parent: Option<&Container>) {}
            fn local_transform_mut(&mut self) -> &mut Transform {
                &mut self.transform
            }
        }

        let pool =
            Pool::from_template(1024, Some(Node::default()), HostOptions::default()).unwrap();
        b.iter(|| {
            let obj = black_box(pool.acquire().unwrap());
            pool.recycle(&obj).unwrap();
        })
    });
    c.bench_function("system", |b| {
        b.iter(|| {
            let obj = black_box(Buffer::default());
            black_box(obj.data.capacity())
        })
    });
}

fn growth(c: &mut Criterion) {
    c.bench_function("pool_growth", |b| {
        b.iter(|| {
            let pool = Pool::<Buffer>::new(0).unwrap();
            for _ in 0..64 {
                black_box(pool.acquire().unwrap());
            }
            pool.destroy().unwrap();
        })
    });
}

criterion_group!(benches, acquire_recycle, growth);
criterion_main!(benches);
