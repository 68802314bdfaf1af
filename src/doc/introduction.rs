/*!
# Introductory Tutorial for VRM

VRM loads a program into the memory of the real machine and lets you
step through it one instruction, trap or interrupt at a time.

A program file holds one word per line. A line starting with `@` moves
the load address, lines starting with `;` are comments.

```text
; interrupt vector
@000
00700
00700
00700
; virtual machine 0
@070
CR010
AD011
CM012
PD012
HALT
@080
00040
00002
; supervisor
@670
STVM0
HALT
; handler: resume whatever was interrupted
@700
STVM0
```

The supervisor creates virtual machine 0 in the window starting at word
70 and hands control to it. Run the file and press ENTER a few times.

<pre><code>&nbsp;  670 S STVM0
&nbsp;>
&nbsp;  RM  STVM0
&nbsp;>
&nbsp;  VM0 CR010
</code></pre>

Addresses inside the virtual machine are relative: `CR010` reads word 10
of its own window, which is word 80 of real memory. When it reaches
`PD012` the virtual machine cannot talk to the screen itself. It traps,
the real machine performs `PD082` for it, and the screen shows `00042`.
Every finished transfer raises an I/O interrupt, so the next step jumps
to the handler at 700, which simply restarts the machine with `STVM0`.

When the virtual machine executes `HALT` its slot is freed and the
supervisor carries on with its own `HALT`.

Type `r` to run until the machine halts and `q` to quit. Stop a running
program with CTRL-C.
*/
